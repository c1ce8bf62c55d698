mod profile;
mod shared;
mod task;

use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
pub use profile::{IProfileRepo, InMemoryProfileRepo, PostgresProfileRepo};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
pub use task::{ITaskRepo, InMemoryTaskRepo, PostgresTaskRepo};
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub tasks: Arc<dyn ITaskRepo>,
    pub profiles: Arc<dyn IProfileRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        sqlx::migrate!()
            .run(&pool)
            .await
            .context("Unable to run database migrations")?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            tasks: Arc::new(PostgresTaskRepo::new(pool.clone())),
            profiles: Arc::new(PostgresProfileRepo::new(pool)),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            tasks: Arc::new(InMemoryTaskRepo::new()),
            profiles: Arc::new(InMemoryProfileRepo::new()),
        }
    }
}

pub(crate) fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub(crate) fn from_millis(ts: i64) -> anyhow::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts)
        .single()
        .with_context(|| format!("Timestamp {} is out of range", ts))
}
