use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Rating, Role, ServiceRequest};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct ActorParams {
    actor_id: Uuid,
    role: Role,
}

#[derive(Serialize, Deserialize)]
pub struct CancelParams {
    actor_id: Uuid,
    canceled_by: Role,
}

#[derive(Serialize, Deserialize)]
pub struct PayParams {
    payment_method_token: String,
}

#[derive(Serialize, Deserialize)]
pub struct RateParams {
    stars: u8,
    comment: Option<String>,
}

pub async fn depart(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<ActorParams>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api
        .record_departure(id, params.actor_id, params.role)
        .await?;

    Ok(request.into())
}

pub async fn arrived(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<ActorParams>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api.record_arrival(id, params.actor_id, params.role).await?;

    Ok(request.into())
}

pub async fn complete(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<ActorParams>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api
        .record_completion(id, params.actor_id, params.role)
        .await?;

    Ok(request.into())
}

pub async fn confirm(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<ActorParams>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api.confirm_job(id, params.actor_id, params.role).await?;

    Ok(request.into())
}

pub async fn cancel(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<CancelParams>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api
        .cancel_job(id, params.actor_id, params.canceled_by)
        .await?;

    Ok(request.into())
}

pub async fn pay(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<PayParams>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api.pay_job(id, params.payment_method_token).await?;

    Ok(request.into())
}

pub async fn rate(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<RateParams>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api
        .rate_job(
            id,
            Rating {
                stars: params.stars,
                comment: params.comment,
            },
        )
        .await?;

    Ok(request.into())
}
