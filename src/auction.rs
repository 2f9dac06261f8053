use std::time::Duration;

use uuid::Uuid;

use crate::api::AuctionAPI;

/// Length of the bidding window opened for every new service request.
pub const AUCTION_WINDOW_SECS: u64 = 240;

/// Second-resolution countdown over the bidding window. Ticks clamp at zero
/// and stay there, so a late tick can never drive the window negative.
#[derive(Clone, Copy, Debug)]
pub struct Countdown {
    remaining: u64,
}

impl Countdown {
    pub fn new(secs: u64) -> Self {
        Self { remaining: secs }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn tick(&mut self) -> u64 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining == 0
    }
}

/// Runs the hard auction timeout for a request. Not cancelable by either
/// party; expiry itself is a no-op on the engine side once a bid has been
/// accepted.
#[tracing::instrument(skip(api))]
pub async fn run_expiry_timer<T>(api: &T, request_id: Uuid, window_secs: u64)
where
    T: AuctionAPI + ?Sized,
{
    let mut countdown = Countdown::new(window_secs);
    let mut interval = tokio::time::interval(Duration::from_secs(1));

    // the first tick of a tokio interval completes immediately
    interval.tick().await;

    while !countdown.is_elapsed() {
        interval.tick().await;
        countdown.tick();
    }

    tracing::info!("auction window elapsed, closing bidding...");

    if let Err(err) = api.expire_auction(request_id).await {
        tracing::warn!("failed to expire auction: {:?}", err.message);
    }
}
