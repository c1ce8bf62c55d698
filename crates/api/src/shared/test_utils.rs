use std::sync::atomic::{AtomicUsize, Ordering};
use taskflow_domain::{Profile, ReminderCandidate, Task, ID};
use taskflow_infra::{
    INotifier, IProfileRepo, ITaskRepo, InMemoryNotifier, InMemoryProfileRepo, InMemoryTaskRepo,
    NotifierError,
};
use tokio_util::sync::CancellationToken;

/// Profile repo that counts lookups and can fail them for given users
#[derive(Default)]
pub struct CountingProfileRepo {
    inner: InMemoryProfileRepo,
    lookups: AtomicUsize,
    broken_users: std::sync::Mutex<Vec<ID>>,
}

impl CountingProfileRepo {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn break_lookup_for(&self, user_id: ID) {
        self.broken_users.lock().unwrap().push(user_id);
    }
}

#[async_trait::async_trait]
impl IProfileRepo for CountingProfileRepo {
    async fn insert(&self, profile: &Profile) -> anyhow::Result<()> {
        self.inner.insert(profile).await
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Option<Profile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.broken_users.lock().unwrap().contains(user_id) {
            anyhow::bail!("Connection reset while looking up profile");
        }
        self.inner.find_by_user(user_id).await
    }
}

/// Task repo whose reads and writes can be made to fail
#[derive(Default)]
pub struct FlakyTaskRepo {
    inner: InMemoryTaskRepo,
    pub fail_fetch: bool,
    pub fail_mark: bool,
    fetches: AtomicUsize,
    mark_attempts: AtomicUsize,
    marked: std::sync::Mutex<Vec<Vec<ID>>>,
}

impl FlakyTaskRepo {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn mark_attempts(&self) -> usize {
        self.mark_attempts.load(Ordering::SeqCst)
    }

    /// The ids passed to every successful `mark_reminded` call
    pub fn marked_ids(&self) -> Vec<Vec<ID>> {
        self.marked.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ITaskRepo for FlakyTaskRepo {
    async fn insert(&self, task: &Task) -> anyhow::Result<()> {
        self.inner.insert(task).await
    }

    async fn find(&self, task_id: &ID) -> Option<Task> {
        self.inner.find(task_id).await
    }

    async fn fetch_reminder_candidates(&self) -> anyhow::Result<Vec<ReminderCandidate>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            anyhow::bail!("Task store is unreachable");
        }
        self.inner.fetch_reminder_candidates().await
    }

    async fn mark_reminded(&self, task_ids: &[ID], at: i64) -> anyhow::Result<u64> {
        self.mark_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_mark {
            anyhow::bail!("Task store is unreachable");
        }
        let updated = self.inner.mark_reminded(task_ids, at).await?;
        self.marked.lock().unwrap().push(task_ids.to_vec());
        Ok(updated)
    }
}

/// Delivers like `InMemoryNotifier` and cancels `cancel` right after the
/// first delivery
pub struct CancellingNotifier {
    pub inner: InMemoryNotifier,
    pub cancel: CancellationToken,
}

#[async_trait::async_trait]
impl INotifier for CancellingNotifier {
    async fn send(
        &self,
        address: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), NotifierError> {
        let res = self.inner.send(address, subject, html_body).await;
        self.cancel.cancel();
        res
    }
}
