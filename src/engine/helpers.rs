use super::Database;

use sqlx::{types::Json, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{Bid, ServiceRequest},
    error::{invalid_input_error, Error},
};

#[tracing::instrument(skip(tx))]
pub async fn fetch_request_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<ServiceRequest, Error> {
    let Json(request): Json<ServiceRequest> = tx
        .fetch_optional(
            sqlx::query("SELECT data FROM requests WHERE id = $1 FOR UPDATE").bind(id),
        )
        .await?
        .ok_or_else(|| invalid_input_error())?
        .try_get("data")?;

    Ok(request)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_bid_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Bid, Error> {
    let Json(bid): Json<Bid> = tx
        .fetch_optional(sqlx::query("SELECT data FROM bids WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(|| invalid_input_error())?
        .try_get("data")?;

    Ok(bid)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_pending_bids_for_update(
    tx: &mut Transaction<'_, Database>,
    request_id: &Uuid,
) -> Result<Vec<Bid>, Error> {
    let rows = tx
        .fetch_all(
            sqlx::query(
                "SELECT data FROM bids WHERE request_id = $1 AND status = 'pending' FOR UPDATE",
            )
            .bind(request_id),
        )
        .await?;

    let mut bids = Vec::with_capacity(rows.len());

    for row in rows.iter() {
        let Json(bid): Json<Bid> = row.try_get("data")?;
        bids.push(bid);
    }

    Ok(bids)
}

#[tracing::instrument(skip(tx))]
pub async fn update_request(
    tx: &mut Transaction<'_, Database>,
    request: &ServiceRequest,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE requests SET tire_status = $2, data = $3 WHERE id = $1")
            .bind(&request.id)
            .bind(request.status.name())
            .bind(Json(request)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_bid(tx: &mut Transaction<'_, Database>, bid: &Bid) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE bids SET status = $2, data = $3 WHERE id = $1")
            .bind(&bid.id)
            .bind(bid.status.name())
            .bind(Json(bid)),
    )
    .await?;

    Ok(())
}
