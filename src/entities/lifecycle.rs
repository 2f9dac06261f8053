use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    Arrived,
    JobCompleted,
    JobConfirmed,
    CustomerCanceled,
    JobCanceled,
}

impl LifecycleEventKind {
    pub fn name(&self) -> String {
        match self {
            Self::Arrived => "arrived".into(),
            Self::JobCompleted => "job_completed".into(),
            Self::JobConfirmed => "job_confirmed".into(),
            Self::CustomerCanceled => "customer_canceled".into(),
            Self::JobCanceled => "job_canceled".into(),
        }
    }

    pub fn emitted_by(&self) -> Role {
        match self {
            Self::Arrived | Self::JobCompleted | Self::JobCanceled => Role::Provider,
            Self::JobConfirmed | Self::CustomerCanceled => Role::Customer,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub kind: LifecycleEventKind,
    pub request_id: Uuid,
    pub actor_id: Uuid,
    pub counterpart_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn new(
        kind: LifecycleEventKind,
        request_id: Uuid,
        actor_id: Uuid,
        counterpart_id: Uuid,
    ) -> Self {
        Self {
            kind,
            request_id,
            actor_id,
            counterpart_id,
            timestamp: Utc::now(),
        }
    }
}
