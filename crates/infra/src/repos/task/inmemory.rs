use super::ITaskRepo;
use crate::repos::shared::inmemory_repo::*;
use taskflow_domain::{ReminderCandidate, Task, ID};

pub struct InMemoryTaskRepo {
    tasks: std::sync::Mutex<Vec<Task>>,
}

impl InMemoryTaskRepo {
    pub fn new() -> Self {
        Self {
            tasks: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for InMemoryTaskRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ITaskRepo for InMemoryTaskRepo {
    async fn insert(&self, task: &Task) -> anyhow::Result<()> {
        insert(task, &self.tasks);
        Ok(())
    }

    async fn find(&self, task_id: &ID) -> Option<Task> {
        find(task_id, &self.tasks)
    }

    async fn fetch_reminder_candidates(&self) -> anyhow::Result<Vec<ReminderCandidate>> {
        Ok(find_by(&self.tasks, |t| t.is_reminder_candidate())
            .iter()
            .map(ReminderCandidate::from)
            .collect())
    }

    async fn mark_reminded(&self, task_ids: &[ID], at: i64) -> anyhow::Result<u64> {
        Ok(update_many(
            &self.tasks,
            |t| task_ids.contains(&t.id),
            |t| t.last_reminder_sent = Some(at),
        ))
    }
}
