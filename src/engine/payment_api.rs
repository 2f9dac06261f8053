use super::helpers::{fetch_bid_for_update, fetch_request_for_update, update_request};
use super::Engine;

use async_trait::async_trait;
use sqlx::Acquire;
use uuid::Uuid;

use crate::{
    api::PaymentAPI,
    entities::{Rating, RequestStatus, ServiceRequest},
    error::{invalid_input_error, invalid_state_error, Error},
    external::payments,
};

#[async_trait]
impl PaymentAPI for Engine {
    #[tracing::instrument(skip(self, method_token))]
    async fn pay_job(
        &self,
        request_id: Uuid,
        method_token: String,
    ) -> Result<ServiceRequest, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        // the row lock is held across the charge; a concurrent payer queues
        // behind it and then fails the status check before any money moves
        let mut request = fetch_request_for_update(&mut tx, &request_id).await?;

        match request.status {
            RequestStatus::Confirmed => (),
            _ => return Err(invalid_state_error()),
        }

        let bid_id = request.accepted_bid_id.ok_or_else(|| invalid_state_error())?;
        let bid = fetch_bid_for_update(&mut tx, &bid_id).await?;

        let amount_minor = payments::to_minor_units(bid.amount);

        tracing::info!("authorizing payment of {} minor units...", amount_minor);
        let intent = payments::authorize(&method_token, amount_minor).await?;

        tracing::info!("capturing payment intent {}...", &intent.id);
        payments::capture(&intent.id).await?;

        request.record_payment()?;

        update_request(&mut tx, &request).await?;
        tx.commit().await?;

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    async fn rate_job(&self, request_id: Uuid, rating: Rating) -> Result<ServiceRequest, Error> {
        if rating.stars < 1 || rating.stars > 5 {
            return Err(invalid_input_error());
        }

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut request = fetch_request_for_update(&mut tx, &request_id).await?;
        request.record_rating(rating)?;

        update_request(&mut tx, &request).await?;
        tx.commit().await?;

        Ok(request)
    }
}
