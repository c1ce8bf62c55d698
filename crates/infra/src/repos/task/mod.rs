mod inmemory;
mod postgres;

pub use inmemory::InMemoryTaskRepo;
pub use postgres::PostgresTaskRepo;
use taskflow_domain::{ReminderCandidate, Task, ID};

#[async_trait::async_trait]
pub trait ITaskRepo: Send + Sync {
    async fn insert(&self, task: &Task) -> anyhow::Result<()>;
    async fn find(&self, task_id: &ID) -> Option<Task>;
    /// Incomplete tasks with reminders enabled and a positive reminder interval
    async fn fetch_reminder_candidates(&self) -> anyhow::Result<Vec<ReminderCandidate>>;
    /// Sets the last reminder timestamp of exactly the given tasks to `at`
    /// and returns how many tasks were updated
    async fn mark_reminded(&self, task_ids: &[ID], at: i64) -> anyhow::Result<u64>;
}
