use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::{RequestAPI, RequestDraft},
    entities::{Coordinates, RouteGeometry, ServiceRequest},
    error::{invalid_input_error, Error},
    external::routing,
    realtime::Event,
};

#[async_trait]
impl RequestAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_request(&self, draft: RequestDraft) -> Result<ServiceRequest, Error> {
        if !(draft.budget > 0.0) {
            return Err(invalid_input_error());
        }

        let request = ServiceRequest::new(
            draft.customer_id,
            draft.tire_size,
            draft.vehicle,
            draft.description,
            draft.location,
            draft.budget,
            draft.urgency,
        );

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO requests (id, tire_status, data) VALUES ($1, $2, $3)")
                .bind(&request.id)
                .bind(request.status.name())
                .bind(Json(&request)),
        )
        .await?;

        self.dispatcher
            .dispatch(Event::NewRequest {
                request_id: request.id,
                customer_id: request.customer_id,
            })
            .await;

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    async fn find_request(&self, id: Uuid) -> Result<ServiceRequest, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM requests WHERE id = $1").bind(&id))
            .await?;

        let result = maybe_result.ok_or_else(|| invalid_input_error())?;
        let Json(request): Json<ServiceRequest> = result.try_get("data")?;

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_route_to(
        &self,
        request_id: Uuid,
        origin: Coordinates,
    ) -> Result<RouteGeometry, Error> {
        let request = self.find_request(request_id).await?;

        routing::fetch_route(origin, request.location.coordinates).await
    }
}
