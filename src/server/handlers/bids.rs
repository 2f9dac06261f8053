use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Bid, ServiceRequest};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct SubmitParams {
    provider_id: Uuid,
    amount: f64,
    eta: String,
    message: Option<String>,
}

pub async fn submit(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<SubmitParams>,
) -> Result<Json<Bid>, Error> {
    let bid = api
        .submit_bid(
            id,
            params.provider_id,
            params.amount,
            params.eta,
            params.message,
        )
        .await?;

    Ok(bid.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Bid>>, Error> {
    let bids = api.list_bids(id).await?;

    Ok(bids.into())
}

pub async fn accept(
    Extension(api): Extension<DynAPI>,
    Path((id, bid_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api.accept_bid(id, bid_id).await?;

    Ok(request.into())
}

pub async fn reject(
    Extension(api): Extension<DynAPI>,
    Path((id, bid_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Bid>, Error> {
    let bid = api.reject_bid(id, bid_id).await?;

    Ok(bid.into())
}
