use super::send_task_reminders::{SendTaskRemindersUseCase, UseCaseError};
use crate::shared::usecase::execute;
use std::future::Future;
use taskflow_domain::DispatchResult;
use taskflow_infra::TaskflowContext;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

/// Keeps track of every reminder run, whether started by the job scheduler
/// or over http, so that shutdown can wait for their timestamps to be stored.
#[derive(Debug, Clone, Default)]
pub struct ReminderRuns {
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl ReminderRuns {
    pub fn new() -> Self {
        Default::default()
    }

    /// Cancelled once shutdown has begun
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Wraps `future` so that `shutdown` waits for it
    pub fn track<F: Future>(&self, future: F) -> impl Future<Output = F::Output> {
        self.tracker.track_future(future)
    }

    /// One reminder run. It stops starting work for more users once shutdown
    /// has begun, but always stores the timestamps of the users it notified.
    pub fn run(
        &self,
        ctx: TaskflowContext,
    ) -> impl Future<Output = Result<DispatchResult, UseCaseError>> {
        let usecase = SendTaskRemindersUseCase::with_cancellation(self.shutdown.child_token());
        self.track(async move { execute(usecase, &ctx).await })
    }

    /// Stops new runs and waits until every tracked run is done
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.tracker.close();
        if !self.tracker.is_empty() {
            info!("Waiting for {} reminder task(s) to finish", self.tracker.len());
        }
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{CountingProfileRepo, FlakyTaskRepo};
    use std::sync::Arc;
    use std::time::Duration;
    use taskflow_domain::{FailureReason, Profile, Task, ID};
    use taskflow_infra::{IProfileRepo, ITaskRepo, InMemoryNotifier, StaticSys};

    const NOW: i64 = 1613865600000;

    #[actix_web::main]
    #[test]
    async fn shutdown_waits_for_ongoing_run_to_store_timestamps() {
        let tasks = Arc::new(FlakyTaskRepo::default());
        let profiles = Arc::new(CountingProfileRepo::default());
        let notifier = Arc::new(InMemoryNotifier::with_delay(Duration::from_millis(300)));
        let mut ctx = TaskflowContext::create_inmemory();
        ctx.repos.tasks = tasks.clone();
        ctx.repos.profiles = profiles.clone();
        ctx.notifier = notifier.clone();
        ctx.sys = Arc::new(StaticSys(NOW));
        ctx.config.io_timeout = Duration::from_secs(2);
        ctx.config.dispatch_concurrency = 1;

        let user_a = ID::new();
        let user_b = ID::new();
        for (user_id, email) in &[(user_a, "a@example.com"), (user_b, "b@example.com")] {
            profiles
                .insert(&Profile {
                    user_id: *user_id,
                    email: Some(email.to_string()),
                    name: None,
                })
                .await
                .unwrap();
        }
        let task_a = Task::new(user_a, "A", NOW).with_reminder(60);
        let task_b = Task::new(user_b, "B", NOW).with_reminder(60);
        tasks.insert(&task_a).await.unwrap();
        tasks.insert(&task_b).await.unwrap();

        let runs = ReminderRuns::new();
        let handle = actix_web::rt::spawn(runs.run(ctx.clone()));

        // User A is being notified while shutdown begins
        tokio::time::sleep(Duration::from_millis(100)).await;
        runs.shutdown().await;

        let result = handle.await.unwrap().expect("Run to succeed");
        assert_eq!(result.sent_count, 1);
        assert_eq!(result.failed_users.get(&user_b), Some(&FailureReason::Cancelled));
        assert_eq!(notifier.sent_messages().len(), 1);
        assert_eq!(tasks.marked_ids(), vec![vec![task_a.id]]);

        let task_a = tasks.find(&task_a.id).await.unwrap();
        assert_eq!(task_a.last_reminder_sent, Some(NOW));
        let task_b = tasks.find(&task_b.id).await.unwrap();
        assert_eq!(task_b.last_reminder_sent, None);
    }

    #[actix_web::main]
    #[test]
    async fn runs_started_after_shutdown_notify_nobody() {
        let notifier = Arc::new(InMemoryNotifier::new());
        let mut ctx = TaskflowContext::create_inmemory();
        ctx.notifier = notifier.clone();
        ctx.sys = Arc::new(StaticSys(NOW));
        let user = ID::new();
        ctx.repos
            .profiles
            .insert(&Profile {
                user_id: user,
                email: Some("u@example.com".into()),
                name: None,
            })
            .await
            .unwrap();
        ctx.repos
            .tasks
            .insert(&Task::new(user, "A", NOW).with_reminder(60))
            .await
            .unwrap();

        let runs = ReminderRuns::new();
        runs.shutdown().await;
        let result = runs.run(ctx).await.expect("Run to succeed");

        assert_eq!(result.failed_users.get(&user), Some(&FailureReason::Cancelled));
        assert_eq!(notifier.attempts(), 0);
    }
}
