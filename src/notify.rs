use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand_distr::{Distribution, Normal};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::realtime::{Event, Hub};

/// Surfaces events to the opposite party's rooms. Whether a delivery chimes
/// on the client is carried by `Event::requires_alert`.
#[derive(Clone)]
pub struct Dispatcher {
    hub: Arc<Hub>,
}

impl Dispatcher {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    #[tracing::instrument(skip(self))]
    pub async fn dispatch(&self, event: Event) -> usize {
        let mut delivered = 0;

        for room in event.rooms() {
            delivered += self.hub.publish(&room, event.clone()).await;
        }

        if delivered == 0 {
            tracing::warn!(
                "no connected members for {:?} event, state is re-fetchable over http",
                event.name()
            );
        }

        delivered
    }

    /// Demo mode: pretends the provider pulls up after a plausible delay and
    /// dispatches `provider_arrived` to the customer. The handle can be
    /// dropped into a join set or aborted when the demo screen goes away.
    #[tracing::instrument(skip(self))]
    pub fn simulate_arrival(
        &self,
        request_id: Uuid,
        provider_id: Uuid,
        customer_id: Uuid,
        mean_delay_secs: f64,
    ) -> JoinHandle<()> {
        let hub = self.hub.clone();

        tokio::spawn(async move {
            let delay = sample_delay(mean_delay_secs);

            tracing::info!("simulated provider arriving in {:.1}s", delay);
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;

            let event = Event::ProviderArrived {
                request_id,
                provider_id,
                customer_id,
                timestamp: Utc::now(),
            };

            for room in event.rooms() {
                hub.publish(&room, event.clone()).await;
            }
        })
    }
}

fn sample_delay(mean_secs: f64) -> f64 {
    match Normal::new(mean_secs, mean_secs / 4.0) {
        Ok(dist) => dist.sample(&mut rand::thread_rng()).max(0.0),
        Err(_) => mean_secs.max(0.0),
    }
}
