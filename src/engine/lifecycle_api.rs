use super::helpers::{fetch_request_for_update, update_request};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Acquire;
use uuid::Uuid;

use crate::{
    api::LifecycleAPI,
    entities::{
        LifecycleEvent, LifecycleEventKind, RequestStatus, Role, ServiceRequest, Transition,
    },
    error::{actor_mismatch_error, invalid_state_error, Error},
    realtime::Event,
};

#[async_trait]
impl LifecycleAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn record_departure(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut request = fetch_request_for_update(&mut tx, &request_id).await?;

        // only the booked provider departs
        if role != Role::Provider {
            return Err(actor_mismatch_error());
        }
        request.verify_actor(role, actor_id)?;

        request.depart()?;

        update_request(&mut tx, &request).await?;
        tx.commit().await?;

        // label change only; the event vocabulary has no en-route entry
        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    async fn record_arrival(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error> {
        self.apply_lifecycle_event(request_id, LifecycleEventKind::Arrived, actor_id, role)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn record_completion(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error> {
        self.apply_lifecycle_event(request_id, LifecycleEventKind::JobCompleted, actor_id, role)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn confirm_job(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error> {
        self.apply_lifecycle_event(request_id, LifecycleEventKind::JobConfirmed, actor_id, role)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_job(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        canceled_by: Role,
    ) -> Result<ServiceRequest, Error> {
        let kind = match canceled_by {
            Role::Customer => LifecycleEventKind::CustomerCanceled,
            Role::Provider => LifecycleEventKind::JobCanceled,
        };

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut request = fetch_request_for_update(&mut tx, &request_id).await?;

        request.verify_reporter(kind, actor_id, canceled_by)?;

        // a repeated cancellation is idempotent, a settled job is not cancelable
        if let RequestStatus::Canceled { canceled_by: _ } = request.status {
            return Ok(request);
        }

        if !request.can_cancel() {
            return Err(invalid_state_error());
        }

        match request.apply(kind, Utc::now()) {
            Transition::Applied => (),
            Transition::Ignored => return Err(invalid_state_error()),
        }

        update_request(&mut tx, &request).await?;
        tx.commit().await?;

        self.dispatch_lifecycle(&request, kind).await?;

        Ok(request)
    }
}

impl Engine {
    /// Shared path for the provider/customer lifecycle reports. The reporter
    /// must hold the role that owns the event; ignored transitions
    /// (duplicates, out-of-order deliveries) leave the stored request
    /// untouched and emit nothing.
    async fn apply_lifecycle_event(
        &self,
        request_id: Uuid,
        kind: LifecycleEventKind,
        actor_id: Uuid,
        role: Role,
    ) -> Result<ServiceRequest, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut request = fetch_request_for_update(&mut tx, &request_id).await?;

        request.verify_reporter(kind, actor_id, role)?;

        match request.apply(kind, Utc::now()) {
            Transition::Ignored => {
                tracing::warn!("lifecycle event did not advance the request, ignoring");
                return Ok(request);
            }
            Transition::Applied => (),
        }

        update_request(&mut tx, &request).await?;
        tx.commit().await?;

        self.dispatch_lifecycle(&request, kind).await?;

        Ok(request)
    }

    async fn dispatch_lifecycle(
        &self,
        request: &ServiceRequest,
        kind: LifecycleEventKind,
    ) -> Result<(), Error> {
        let request_id = request.id;
        let customer_id = request.customer_id;

        // cancellation before any acceptance has no counterpart to notify
        let provider_id = match request.provider_id {
            Some(provider_id) => provider_id,
            None => return Ok(()),
        };

        let id_of = |role: Role| match role {
            Role::Customer => customer_id,
            Role::Provider => provider_id,
        };

        let actor_role = kind.emitted_by();

        let lifecycle = LifecycleEvent::new(
            kind,
            request_id,
            id_of(actor_role),
            id_of(actor_role.counterpart()),
        );
        let timestamp = lifecycle.timestamp;

        let event = match lifecycle.kind {
            LifecycleEventKind::Arrived => Event::Arrived {
                request_id,
                provider_id,
                customer_id,
                timestamp,
            },
            LifecycleEventKind::JobCompleted => Event::JobCompleted {
                request_id,
                provider_id,
                customer_id,
                timestamp,
            },
            LifecycleEventKind::JobConfirmed => Event::JobConfirmed {
                request_id,
                provider_id,
                customer_id,
                timestamp,
            },
            LifecycleEventKind::CustomerCanceled => Event::CustomerCanceled {
                request_id,
                provider_id,
                customer_id,
                timestamp,
            },
            LifecycleEventKind::JobCanceled => Event::JobCanceled {
                request_id,
                provider_id,
                customer_id,
                timestamp,
            },
        };

        self.dispatcher.dispatch(event).await;

        Ok(())
    }
}
