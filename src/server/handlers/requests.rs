use axum::extract::{Extension, Json, Path, Query};
use uuid::Uuid;

use crate::api::RequestDraft;
use crate::auction::{run_expiry_timer, AUCTION_WINDOW_SECS};
use crate::entities::{Coordinates, RouteGeometry, ServiceRequest};
use crate::error::Error;
use crate::server::DynAPI;

#[axum_macros::debug_handler]
pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(draft): Json<RequestDraft>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api.create_request(draft).await?;

    // the hard auction timeout starts with the request and is not cancelable
    let timer_api = api.clone();
    let request_id = request.id;

    tokio::spawn(async move {
        run_expiry_timer(&*timer_api, request_id, AUCTION_WINDOW_SECS).await;
    });

    Ok(request.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceRequest>, Error> {
    let request = api.find_request(id).await?;

    Ok(request.into())
}

/// Driving geometry from the caller's position to the service location, for
/// the client-side marker animation.
pub async fn route(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Query(origin): Query<Coordinates>,
) -> Result<Json<RouteGeometry>, Error> {
    let route = api.fetch_route_to(id, origin).await?;

    Ok(route.into())
}
