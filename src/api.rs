use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    Bid, Coordinates, Location, Rating, Role, RouteGeometry, ServiceRequest, Urgency,
};
use crate::error::Error;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestDraft {
    pub customer_id: Uuid,
    pub tire_size: String,
    pub vehicle: String,
    pub description: String,
    pub location: Location,
    pub budget: f64,
    pub urgency: Urgency,
}

#[async_trait]
pub trait RequestAPI {
    async fn create_request(&self, draft: RequestDraft) -> Result<ServiceRequest, Error>;
    async fn find_request(&self, id: Uuid) -> Result<ServiceRequest, Error>;

    /// Driving geometry from `origin` to the request's service location,
    /// for clients animating the provider marker.
    async fn fetch_route_to(
        &self,
        request_id: Uuid,
        origin: Coordinates,
    ) -> Result<RouteGeometry, Error>;
}

#[async_trait]
pub trait AuctionAPI {
    async fn submit_bid(
        &self,
        request_id: Uuid,
        provider_id: Uuid,
        amount: f64,
        eta: String,
        message: Option<String>,
    ) -> Result<Bid, Error>;

    async fn list_bids(&self, request_id: Uuid) -> Result<Vec<Bid>, Error>;

    async fn accept_bid(&self, request_id: Uuid, bid_id: Uuid) -> Result<ServiceRequest, Error>;

    async fn reject_bid(&self, request_id: Uuid, bid_id: Uuid) -> Result<Bid, Error>;

    async fn expire_auction(&self, request_id: Uuid) -> Result<ServiceRequest, Error>;
}

/// Every report names the acting party; the engine rejects reports from a
/// caller that does not hold the claimed role on the job.
#[async_trait]
pub trait LifecycleAPI {
    async fn record_departure(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error>;

    async fn record_arrival(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error>;

    async fn record_completion(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error>;

    async fn confirm_job(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error>;

    async fn cancel_job(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        canceled_by: Role,
    ) -> Result<ServiceRequest, Error>;
}

#[async_trait]
pub trait PaymentAPI {
    async fn pay_job(
        &self,
        request_id: Uuid,
        method_token: String,
    ) -> Result<ServiceRequest, Error>;

    async fn rate_job(&self, request_id: Uuid, rating: Rating) -> Result<ServiceRequest, Error>;
}

pub trait API: RequestAPI + AuctionAPI + LifecycleAPI + PaymentAPI {}
