mod auction_api;
mod helpers;
mod lifecycle_api;
mod payment_api;
mod request_api;

use sqlx::{Executor, Pool, Postgres};

use crate::{api::API, error::Error, notify::Dispatcher};

type Database = Postgres;

pub struct Engine {
    pool: Pool<Database>,
    dispatcher: Dispatcher,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>, dispatcher: Dispatcher) -> Result<Self, Error> {
        // request service
        pool.execute(
            "CREATE TABLE IF NOT EXISTS requests (id UUID PRIMARY KEY, tire_status VARCHAR NOT NULL, data JSONB NOT NULL)",
        )
        .await?;

        // bid service
        pool.execute(
            "CREATE TABLE IF NOT EXISTS bids (id UUID PRIMARY KEY, request_id UUID NOT NULL, status VARCHAR NOT NULL, submitted_at TIMESTAMPTZ NOT NULL, data JSONB NOT NULL)",
        )
        .await?;

        Ok(Self { pool, dispatcher })
    }
}

impl API for Engine {}
