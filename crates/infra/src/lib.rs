mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{IProfileRepo, ITaskRepo, InMemoryProfileRepo, InMemoryTaskRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticSys};
use tracing::warn;

#[derive(Clone)]
pub struct TaskflowContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifier: Arc<dyn INotifier>,
}

struct ContextParams {
    pub postgres_connection_string: Option<String>,
}

impl TaskflowContext {
    async fn create(params: ContextParams) -> Self {
        let config = Config::new();
        let repos = match params.postgres_connection_string {
            Some(connection_string) => Repos::create_postgres(&connection_string)
                .await
                .expect("Postgres credentials must be valid"),
            None => {
                warn!("{} is not set, falling back to in memory repositories.", PSQL_CONNECTION_STRING);
                Repos::create_inmemory()
            }
        };
        let notifier = Arc::new(ResendNotifier::new(&config));
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            notifier,
        }
    }

    /// Context with in memory repositories and an in memory notifier.
    /// Used in tests, which replace `sys` and `notifier` as they need.
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            notifier: Arc::new(InMemoryNotifier::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> TaskflowContext {
    TaskflowContext::create(ContextParams {
        postgres_connection_string: std::env::var(PSQL_CONNECTION_STRING).ok(),
    })
    .await
}

const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";
