mod inmemory;
mod postgres;

pub use inmemory::InMemoryProfileRepo;
pub use postgres::PostgresProfileRepo;
use taskflow_domain::{Profile, ID};

#[async_trait::async_trait]
pub trait IProfileRepo: Send + Sync {
    async fn insert(&self, profile: &Profile) -> anyhow::Result<()>;
    /// `Ok(None)` when the user has no profile, `Err` when the lookup itself failed
    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Option<Profile>>;
}
