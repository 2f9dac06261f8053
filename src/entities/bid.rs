use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_input_error, invalid_state_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub request_id: Uuid,
    pub provider_id: Uuid,
    pub amount: f64,
    pub eta: String,
    pub message: Option<String>,
    pub status: Status,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Accepted => "accepted".into(),
            Self::Rejected => "rejected".into(),
            Self::Expired => "expired".into(),
        }
    }
}

impl Bid {
    pub fn new(
        request_id: Uuid,
        provider_id: Uuid,
        amount: f64,
        eta: String,
        message: Option<String>,
    ) -> Result<Self, Error> {
        if !(amount > 0.0) || eta.trim().is_empty() {
            return Err(invalid_input_error());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            request_id,
            provider_id,
            amount,
            eta,
            message,
            status: Status::Pending,
            submitted_at: Utc::now(),
        })
    }

    pub fn is_pending(&self) -> bool {
        match self.status {
            Status::Pending => true,
            _ => false,
        }
    }

    #[tracing::instrument]
    pub fn accept(&mut self) -> Result<(), Error> {
        if !self.is_pending() {
            return Err(invalid_state_error());
        }

        self.status = Status::Accepted;
        Ok(())
    }

    #[tracing::instrument]
    pub fn reject(&mut self) -> Result<(), Error> {
        if !self.is_pending() {
            return Err(invalid_state_error());
        }

        self.status = Status::Rejected;
        Ok(())
    }

    #[tracing::instrument]
    pub fn expire(&mut self) {
        if self.is_pending() {
            self.status = Status::Expired;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amount() {
        let result = Bid::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            0.0,
            "30 minutes".into(),
            None,
        );

        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_eta() {
        let result = Bid::new(Uuid::new_v4(), Uuid::new_v4(), 85.0, "  ".into(), None);

        assert!(result.is_err());
    }

    #[test]
    fn accepts_only_from_pending() {
        let mut bid = Bid::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            85.0,
            "30 minutes".into(),
            None,
        )
        .unwrap();

        bid.accept().unwrap();
        assert_eq!(bid.status, Status::Accepted);
        assert!(bid.accept().is_err());
    }

    #[test]
    fn rejection_is_final() {
        let mut bid = Bid::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            90.0,
            "45 minutes".into(),
            None,
        )
        .unwrap();

        assert!(bid.is_pending());
        bid.reject().unwrap();

        assert_eq!(bid.status, Status::Rejected);
        assert!(!bid.is_pending());
        assert!(bid.accept().is_err());
        assert!(bid.reject().is_err());
    }

    #[test]
    fn expire_is_a_noop_on_accepted_bid() {
        let mut bid = Bid::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            75.0,
            "25 minutes".into(),
            Some("two techs on the truck".into()),
        )
        .unwrap();

        bid.accept().unwrap();
        bid.expire();

        assert_eq!(bid.status, Status::Accepted);
    }
}
