mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::API;
use crate::realtime::Hub;
use crate::server::handlers::{bids, jobs, requests, ws};

pub type DynAPI = Arc<dyn API + Send + Sync>;

pub async fn serve<T: API + Sync + Send + 'static>(api: T, hub: Arc<Hub>) {
    let api = Arc::new(api) as DynAPI;

    let app = Router::new()
        .route("/requests", post(requests::create))
        .route("/requests/:id", get(requests::find))
        .route("/requests/:id/route", get(requests::route))
        .route("/requests/:id/bids", post(bids::submit).get(bids::list))
        .route("/requests/:id/bids/:bid_id/accept", patch(bids::accept))
        .route("/requests/:id/bids/:bid_id/reject", patch(bids::reject))
        .route("/requests/:id/depart", patch(jobs::depart))
        .route("/requests/:id/arrived", patch(jobs::arrived))
        .route("/requests/:id/complete", patch(jobs::complete))
        .route("/requests/:id/confirm", patch(jobs::confirm))
        .route("/requests/:id/cancel", patch(jobs::cancel))
        .route("/requests/:id/pay", post(jobs::pay))
        .route("/requests/:id/rate", post(jobs::rate))
        .route("/ws", get(ws::upgrade))
        .layer(Extension(api))
        .layer(Extension(hub));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
