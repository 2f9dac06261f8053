use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auction::AUCTION_WINDOW_SECS;
use crate::entities::{LifecycleEventKind, Location, Role};
use crate::error::{actor_mismatch_error, invalid_state_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub tire_size: String,
    pub vehicle: String,
    pub description: String,
    pub location: Location,
    pub budget: f64,
    pub urgency: Urgency,
    pub status: Status,
    pub provider_id: Option<Uuid>,
    pub accepted_bid_id: Option<Uuid>,
    pub rating: Option<Rating>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Standard,
    Urgent,
}

/// The persisted `tire_status` labels are produced by `Status::name`, which
/// is what the backend treats as authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    BidsOpen { deadline: DateTime<Utc> },
    Accepted,
    EnRoute,
    Arrived { timestamp: DateTime<Utc> },
    Completed { timestamp: DateTime<Utc> },
    Confirmed,
    Paid,
    Rated,
    Canceled { canceled_by: Role },
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub stars: u8,
    pub comment: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::BidsOpen { deadline: _ } => "Bids Open".into(),
            Self::Accepted => "Accepted".into(),
            Self::EnRoute => "En Route".into(),
            Self::Arrived { timestamp: _ } => "Arrived".into(),
            Self::Completed { timestamp: _ } => "Completed".into(),
            Self::Confirmed => "Service Completed".into(),
            Self::Paid => "Paid".into(),
            Self::Rated => "Rated".into(),
            Self::Canceled { canceled_by: _ } => "Canceled".into(),
            Self::Expired => "Time Expired".into(),
        }
    }

    /// Position along the forward path. Terminal dispositions carry no
    /// ordinal; events targeting them are matched explicitly.
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            Self::BidsOpen { deadline: _ } => Some(0),
            Self::Accepted => Some(1),
            Self::EnRoute => Some(2),
            Self::Arrived { timestamp: _ } => Some(3),
            Self::Completed { timestamp: _ } => Some(4),
            Self::Confirmed => Some(5),
            Self::Paid => Some(6),
            Self::Rated => Some(7),
            Self::Canceled { canceled_by: _ } | Self::Expired => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Canceled { canceled_by: _ } | Self::Expired => true,
            _ => false,
        }
    }
}

impl ServiceRequest {
    pub fn new(
        customer_id: Uuid,
        tire_size: String,
        vehicle: String,
        description: String,
        location: Location,
        budget: f64,
        urgency: Urgency,
    ) -> Self {
        let status = Status::BidsOpen {
            deadline: Utc::now() + Duration::seconds(AUCTION_WINDOW_SECS as i64),
        };

        Self {
            id: Uuid::new_v4(),
            customer_id,
            tire_size,
            vehicle,
            description,
            location,
            budget,
            urgency,
            status,
            provider_id: None,
            accepted_bid_id: None,
            rating: None,
        }
    }

    pub fn is_open_for_bids(&self) -> bool {
        match self.status {
            Status::BidsOpen { deadline } => Utc::now() < deadline,
            _ => false,
        }
    }

    #[tracing::instrument]
    pub fn accept_bid(&mut self, bid_id: Uuid, provider_id: Uuid) -> Result<(), Error> {
        if !self.is_open_for_bids() {
            return Err(invalid_state_error());
        }

        self.accepted_bid_id = Some(bid_id);
        self.provider_id = Some(provider_id);
        self.status = Status::Accepted;

        Ok(())
    }

    #[tracing::instrument]
    pub fn depart(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Accepted => {
                self.status = Status::EnRoute;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    /// Auction timeout. A no-op on anything other than an open auction, so
    /// the timer firing after an acceptance does not disturb the job.
    #[tracing::instrument]
    pub fn expire(&mut self) -> Transition {
        match self.status {
            Status::BidsOpen { deadline: _ } => {
                self.status = Status::Expired;
                Transition::Applied
            }
            _ => Transition::Ignored,
        }
    }

    /// Applies a lifecycle event. Events that do not match the machine's
    /// expected edge (duplicates, out-of-order or premature deliveries,
    /// events after a terminal disposition) are ignored rather than applied,
    /// so replaying the realtime stream can never corrupt the status.
    #[tracing::instrument]
    pub fn apply(&mut self, kind: LifecycleEventKind, at: DateTime<Utc>) -> Transition {
        let next = match (kind, &self.status) {
            (LifecycleEventKind::Arrived, Status::Accepted)
            | (LifecycleEventKind::Arrived, Status::EnRoute) => {
                Status::Arrived { timestamp: at }
            }
            (LifecycleEventKind::JobCompleted, Status::Arrived { timestamp: _ }) => {
                Status::Completed { timestamp: at }
            }
            (LifecycleEventKind::JobConfirmed, Status::Completed { timestamp: _ }) => {
                Status::Confirmed
            }
            (LifecycleEventKind::CustomerCanceled, _)
            | (LifecycleEventKind::JobCanceled, _) => {
                if !self.can_cancel() {
                    tracing::warn!("ignoring cancellation of settled request");
                    return Transition::Ignored;
                }

                Status::Canceled {
                    canceled_by: kind.emitted_by(),
                }
            }
            _ => {
                tracing::warn!("ignoring out-of-order lifecycle event");
                return Transition::Ignored;
            }
        };

        self.status = next;
        Transition::Applied
    }

    /// Checks that the named party actually holds the given role on this
    /// job. Before a bid is accepted there is no provider to match.
    pub fn verify_actor(&self, role: Role, actor_id: Uuid) -> Result<(), Error> {
        let expected = match role {
            Role::Customer => Some(self.customer_id),
            Role::Provider => self.provider_id,
        };

        if expected == Some(actor_id) {
            Ok(())
        } else {
            Err(actor_mismatch_error())
        }
    }

    /// A lifecycle report is only honored from the side that owns the event
    /// and from the party on this job's roster.
    pub fn verify_reporter(
        &self,
        kind: LifecycleEventKind,
        actor_id: Uuid,
        role: Role,
    ) -> Result<(), Error> {
        if role != kind.emitted_by() {
            return Err(actor_mismatch_error());
        }

        self.verify_actor(role, actor_id)
    }

    pub fn can_cancel(&self) -> bool {
        match self.status.ordinal() {
            Some(ordinal) => ordinal < 5,
            None => false,
        }
    }

    #[tracing::instrument]
    pub fn record_payment(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Confirmed => {
                self.status = Status::Paid;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    #[tracing::instrument]
    pub fn record_rating(&mut self, rating: Rating) -> Result<(), Error> {
        match self.status {
            Status::Paid => {
                self.rating = Some(rating);
                self.status = Status::Rated;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Coordinates;

    fn open_request() -> ServiceRequest {
        ServiceRequest::new(
            Uuid::new_v4(),
            "225/45R17".into(),
            "2014 Accord".into(),
            "flat on the rear passenger side".into(),
            Location {
                address: "41 Spring St".into(),
                coordinates: Coordinates {
                    latitude: 40.72,
                    longitude: -74.0,
                },
            },
            100.0,
            Urgency::Urgent,
        )
    }

    fn accepted_request() -> ServiceRequest {
        let mut request = open_request();
        request
            .accept_bid(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();
        request
    }

    #[test]
    fn new_request_opens_bidding() {
        let request = open_request();

        assert!(request.is_open_for_bids());
        assert_eq!(request.status.name(), "Bids Open");
    }

    #[test]
    fn at_most_one_bid_is_accepted() {
        let mut request = open_request();
        let first = Uuid::new_v4();

        request.accept_bid(first, Uuid::new_v4()).unwrap();
        assert!(request.accept_bid(Uuid::new_v4(), Uuid::new_v4()).is_err());
        assert_eq!(request.accepted_bid_id, Some(first));
    }

    #[test]
    fn accepting_after_deadline_is_rejected() {
        let mut request = open_request();
        request.status = Status::BidsOpen {
            deadline: Utc::now() - Duration::seconds(1),
        };

        assert!(!request.is_open_for_bids());
        assert!(request.accept_bid(Uuid::new_v4(), Uuid::new_v4()).is_err());
    }

    #[test]
    fn forward_path_runs_to_confirmed() {
        let mut request = accepted_request();

        assert_eq!(
            request.apply(LifecycleEventKind::Arrived, Utc::now()),
            Transition::Applied
        );
        assert_eq!(
            request.apply(LifecycleEventKind::JobCompleted, Utc::now()),
            Transition::Applied
        );
        assert_eq!(
            request.apply(LifecycleEventKind::JobConfirmed, Utc::now()),
            Transition::Applied
        );
        assert_eq!(request.status.name(), "Service Completed");
    }

    #[test]
    fn completed_before_arrived_is_ignored() {
        let mut request = accepted_request();

        assert_eq!(
            request.apply(LifecycleEventKind::JobCompleted, Utc::now()),
            Transition::Ignored
        );
        assert_eq!(request.status, Status::Accepted);
    }

    #[test]
    fn duplicate_arrived_is_a_noop() {
        let mut request = accepted_request();

        request.apply(LifecycleEventKind::Arrived, Utc::now());
        let before = request.status;

        assert_eq!(
            request.apply(LifecycleEventKind::Arrived, Utc::now()),
            Transition::Ignored
        );
        assert_eq!(request.status, before);
    }

    #[test]
    fn duplicate_completed_is_a_noop() {
        let mut request = accepted_request();

        request.apply(LifecycleEventKind::Arrived, Utc::now());
        request.apply(LifecycleEventKind::JobCompleted, Utc::now());
        let before = request.status;

        assert_eq!(
            request.apply(LifecycleEventKind::JobCompleted, Utc::now()),
            Transition::Ignored
        );
        assert_eq!(request.status, before);
    }

    #[test]
    fn cancellation_is_terminal() {
        let mut request = accepted_request();

        assert_eq!(
            request.apply(LifecycleEventKind::CustomerCanceled, Utc::now()),
            Transition::Applied
        );
        assert_eq!(
            request.status,
            Status::Canceled {
                canceled_by: Role::Customer
            }
        );
        assert_eq!(
            request.apply(LifecycleEventKind::Arrived, Utc::now()),
            Transition::Ignored
        );
    }

    #[test]
    fn confirmed_job_cannot_be_canceled() {
        let mut request = accepted_request();

        request.apply(LifecycleEventKind::Arrived, Utc::now());
        request.apply(LifecycleEventKind::JobCompleted, Utc::now());
        request.apply(LifecycleEventKind::JobConfirmed, Utc::now());

        assert_eq!(
            request.apply(LifecycleEventKind::JobCanceled, Utc::now()),
            Transition::Ignored
        );
        assert_eq!(request.status, Status::Confirmed);
    }

    #[test]
    fn expiry_only_applies_to_an_open_auction() {
        let mut open = open_request();
        assert_eq!(open.expire(), Transition::Applied);
        assert_eq!(open.status.name(), "Time Expired");

        let mut accepted = accepted_request();
        assert_eq!(accepted.expire(), Transition::Ignored);
        assert_eq!(accepted.status, Status::Accepted);
    }

    #[test]
    fn lifecycle_reports_come_from_the_owning_side_only() {
        let mut request = open_request();
        let customer_id = request.customer_id;
        let provider_id = Uuid::new_v4();
        request.accept_bid(Uuid::new_v4(), provider_id).unwrap();

        // a customer-issued arrival never reaches the state machine
        assert!(request
            .verify_reporter(LifecycleEventKind::Arrived, customer_id, Role::Customer)
            .is_err());

        // neither does a stranger claiming the provider role
        assert!(request
            .verify_reporter(LifecycleEventKind::Arrived, Uuid::new_v4(), Role::Provider)
            .is_err());

        // confirmation belongs to the customer, not the provider
        assert!(request
            .verify_reporter(LifecycleEventKind::JobConfirmed, provider_id, Role::Provider)
            .is_err());

        assert!(request
            .verify_reporter(LifecycleEventKind::Arrived, provider_id, Role::Provider)
            .is_ok());
        assert!(request
            .verify_reporter(LifecycleEventKind::JobConfirmed, customer_id, Role::Customer)
            .is_ok());
    }

    #[test]
    fn provider_role_is_unverifiable_before_acceptance() {
        let request = open_request();

        assert!(request
            .verify_actor(Role::Provider, Uuid::new_v4())
            .is_err());
        assert!(request
            .verify_actor(Role::Customer, request.customer_id)
            .is_ok());
    }

    #[test]
    fn a_second_payment_is_refused() {
        let mut request = accepted_request();

        request.apply(LifecycleEventKind::Arrived, Utc::now());
        request.apply(LifecycleEventKind::JobCompleted, Utc::now());
        request.apply(LifecycleEventKind::JobConfirmed, Utc::now());

        request.record_payment().unwrap();
        assert!(request.record_payment().is_err());
        assert_eq!(request.status, Status::Paid);
    }

    #[test]
    fn payment_and_rating_follow_confirmation() {
        let mut request = accepted_request();

        assert!(request.record_payment().is_err());

        request.apply(LifecycleEventKind::Arrived, Utc::now());
        request.apply(LifecycleEventKind::JobCompleted, Utc::now());
        request.apply(LifecycleEventKind::JobConfirmed, Utc::now());

        request.record_payment().unwrap();
        request
            .record_rating(Rating {
                stars: 5,
                comment: None,
            })
            .unwrap();
        assert_eq!(request.status, Status::Rated);
    }
}
