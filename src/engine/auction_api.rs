use super::helpers::{
    fetch_bid_for_update, fetch_pending_bids_for_update, fetch_request_for_update, update_bid,
    update_request,
};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::AuctionAPI,
    entities::{Bid, ServiceRequest, Transition},
    error::{auction_closed_error, invalid_input_error, Error},
    realtime::Event,
};

#[async_trait]
impl AuctionAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn submit_bid(
        &self,
        request_id: Uuid,
        provider_id: Uuid,
        amount: f64,
        eta: String,
        message: Option<String>,
    ) -> Result<Bid, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        // the window check and the insert share a row lock, so a bid racing
        // the expiry timer cannot land on an already expired auction
        let request = fetch_request_for_update(&mut tx, &request_id).await?;

        if !request.is_open_for_bids() {
            tracing::info!("request is no longer open for bids, rejecting...");
            return Err(auction_closed_error());
        }

        let bid = Bid::new(request_id, provider_id, amount, eta, message)?;

        tx.execute(
            sqlx::query(
                "INSERT INTO bids (id, request_id, status, submitted_at, data) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&bid.id)
            .bind(&bid.request_id)
            .bind(bid.status.name())
            .bind(&bid.submitted_at)
            .bind(Json(&bid)),
        )
        .await?;

        tx.commit().await?;

        self.dispatcher
            .dispatch(Event::NewBid {
                request_id,
                bid_id: bid.id,
                provider_id,
                customer_id: request.customer_id,
                amount: bid.amount,
                eta: bid.eta.clone(),
            })
            .await;

        Ok(bid)
    }

    #[tracing::instrument(skip(self))]
    async fn list_bids(&self, request_id: Uuid) -> Result<Vec<Bid>, Error> {
        let mut conn = self.pool.acquire().await?;

        // newest first, matching the client's prepend-on-arrival ordering
        let rows = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM bids WHERE request_id = $1 ORDER BY submitted_at DESC, id DESC",
                )
                .bind(&request_id),
            )
            .await?;

        let mut bids = Vec::with_capacity(rows.len());

        for row in rows.iter() {
            let Json(bid): Json<Bid> = row.try_get("data")?;
            bids.push(bid);
        }

        Ok(bids)
    }

    #[tracing::instrument(skip(self))]
    async fn accept_bid(&self, request_id: Uuid, bid_id: Uuid) -> Result<ServiceRequest, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut request = fetch_request_for_update(&mut tx, &request_id).await?;
        let mut bid = fetch_bid_for_update(&mut tx, &bid_id).await?;

        if bid.request_id != request.id {
            return Err(invalid_input_error());
        }

        request.accept_bid(bid.id, bid.provider_id)?;
        bid.accept()?;

        // the chosen bid wins; every other pending bid is explicitly expired
        let mut siblings = fetch_pending_bids_for_update(&mut tx, &request_id).await?;

        for sibling in siblings.iter_mut() {
            if sibling.id == bid.id {
                continue;
            }

            sibling.expire();
            update_bid(&mut tx, sibling).await?;
        }

        update_bid(&mut tx, &bid).await?;
        update_request(&mut tx, &request).await?;

        tx.commit().await?;

        self.dispatcher
            .dispatch(Event::BidSelected {
                request_id,
                bid_id: bid.id,
                provider_id: bid.provider_id,
                customer_id: request.customer_id,
            })
            .await;

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    async fn reject_bid(&self, request_id: Uuid, bid_id: Uuid) -> Result<Bid, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let request = fetch_request_for_update(&mut tx, &request_id).await?;
        let mut bid = fetch_bid_for_update(&mut tx, &bid_id).await?;

        if bid.request_id != request.id {
            return Err(invalid_input_error());
        }

        // declining only makes sense while the auction is running
        if !request.is_open_for_bids() {
            return Err(auction_closed_error());
        }

        bid.reject()?;

        update_bid(&mut tx, &bid).await?;
        tx.commit().await?;

        Ok(bid)
    }

    #[tracing::instrument(skip(self))]
    async fn expire_auction(&self, request_id: Uuid) -> Result<ServiceRequest, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut request = fetch_request_for_update(&mut tx, &request_id).await?;

        match request.expire() {
            Transition::Ignored => {
                tracing::info!("auction already settled, leaving request untouched");
                return Ok(request);
            }
            Transition::Applied => (),
        }

        let mut pending = fetch_pending_bids_for_update(&mut tx, &request_id).await?;

        for bid in pending.iter_mut() {
            bid.expire();
            update_bid(&mut tx, bid).await?;
        }

        update_request(&mut tx, &request).await?;

        tx.commit().await?;

        self.dispatcher
            .dispatch(Event::BidExpired {
                request_id,
                customer_id: request.customer_id,
            })
            .await;

        Ok(request)
    }
}
