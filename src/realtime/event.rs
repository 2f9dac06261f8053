use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Role;
use crate::realtime::Room;

/// The realtime event vocabulary. Tagged on the wire by event name, with the
/// party ids each event needs for routing carried in the payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Join {
        user_id: Uuid,
        role: Role,
    },
    NewRequest {
        request_id: Uuid,
        customer_id: Uuid,
    },
    NewBid {
        request_id: Uuid,
        bid_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        amount: f64,
        eta: String,
    },
    BidSelected {
        request_id: Uuid,
        bid_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
    },
    BidExpired {
        request_id: Uuid,
        customer_id: Uuid,
    },
    Arrived {
        request_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    JobCompleted {
        request_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    JobConfirmed {
        request_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    CustomerCanceled {
        request_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    JobCanceled {
        request_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    ProviderArrived {
        request_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn name(&self) -> String {
        match self {
            Self::Join { .. } => "join".into(),
            Self::NewRequest { .. } => "new_request".into(),
            Self::NewBid { .. } => "new_bid".into(),
            Self::BidSelected { .. } => "bid_selected".into(),
            Self::BidExpired { .. } => "bid_expired".into(),
            Self::Arrived { .. } => "arrived".into(),
            Self::JobCompleted { .. } => "job_completed".into(),
            Self::JobConfirmed { .. } => "job_confirmed".into(),
            Self::CustomerCanceled { .. } => "customer_canceled".into(),
            Self::JobCanceled { .. } => "job_canceled".into(),
            Self::ProviderArrived { .. } => "provider_arrived".into(),
        }
    }

    /// Where the server routes the event: always towards the opposite party,
    /// except `new_request` which fans out to every connected provider.
    /// `join` is connection-scoped and routes nowhere.
    pub fn rooms(&self) -> Vec<Room> {
        let customer = |user_id: &Uuid| Room::User {
            role: Role::Customer,
            user_id: *user_id,
        };
        let provider = |user_id: &Uuid| Room::User {
            role: Role::Provider,
            user_id: *user_id,
        };

        match self {
            Self::Join { .. } => vec![],
            Self::NewRequest { .. } => vec![Room::Role(Role::Provider)],
            Self::NewBid { customer_id, .. } => vec![customer(customer_id)],
            Self::BidSelected { provider_id, .. } => vec![provider(provider_id)],
            Self::BidExpired { customer_id, .. } => vec![customer(customer_id)],
            Self::Arrived { customer_id, .. } => vec![customer(customer_id)],
            Self::JobCompleted { customer_id, .. } => vec![customer(customer_id)],
            Self::JobConfirmed { provider_id, .. } => vec![provider(provider_id)],
            Self::CustomerCanceled { provider_id, .. } => vec![provider(provider_id)],
            Self::JobCanceled { customer_id, .. } => vec![customer(customer_id)],
            Self::ProviderArrived { customer_id, .. } => vec![customer(customer_id)],
        }
    }

    /// Events the opposite party is chimed about, not just shown.
    pub fn requires_alert(&self) -> bool {
        match self {
            Self::NewRequest { .. } | Self::NewBid { .. } => true,
            _ => false,
        }
    }
}
