use super::message::render_reminder;
use futures::{stream, StreamExt};
use std::time::Duration;
use taskflow_domain::{group_by_owner, DispatchResult, FailureReason, ReminderCandidate, UserBatch, ID};
use taskflow_infra::{INotifier, IProfileRepo};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Upper bound for each profile lookup and each delivery
    pub io_timeout: Duration,
    /// Maximum number of users being notified at the same time
    pub concurrency: usize,
}

#[derive(Debug)]
enum UserOutcome {
    Sent(UserBatch),
    Failed(ID, FailureReason),
}

async fn resolve_and_notify(
    batch: UserBatch,
    profiles: &dyn IProfileRepo,
    notifier: &dyn INotifier,
    io_timeout: Duration,
) -> UserOutcome {
    let owner_id = batch.owner_id;
    let profile = match timeout(io_timeout, profiles.find_by_user(&owner_id)).await {
        Ok(Ok(profile)) => profile,
        Ok(Err(e)) => {
            warn!("Could not look up profile for user {}. Err: {:?}", owner_id, e);
            None
        }
        Err(_) => {
            warn!("Profile lookup for user {} timed out", owner_id);
            None
        }
    };
    let recipient = match profile.and_then(|p| p.recipient()) {
        Some(recipient) => recipient,
        None => {
            warn!("Could not find an email address for user {}", owner_id);
            return UserOutcome::Failed(owner_id, FailureReason::ProfileUnresolved);
        }
    };

    let message = render_reminder(&recipient.display_name, &batch.tasks);
    let delivery = timeout(
        io_timeout,
        notifier.send(&recipient.address, &message.subject, &message.html_body),
    )
    .await;
    match delivery {
        Ok(Ok(())) => {
            info!(
                "Reminder for {} task(s) sent to user {}",
                batch.tasks.len(),
                owner_id
            );
            UserOutcome::Sent(batch)
        }
        Ok(Err(e)) => {
            warn!("Failed to send reminder to user {}. Err: {}", owner_id, e);
            UserOutcome::Failed(owner_id, FailureReason::DeliveryFailed)
        }
        Err(_) => {
            warn!("Sending reminder to user {} timed out", owner_id);
            UserOutcome::Failed(owner_id, FailureReason::DeliveryFailed)
        }
    }
}

/// Sends one reminder per owner of the `due` candidates.
///
/// Owners are notified concurrently and independently of each other. A task
/// only ends up in `notified_task_ids` once the delivery to its owner was
/// confirmed. Cancellation is only checked before an owner is started, an
/// owner that is being notified is always finished.
pub async fn dispatch(
    due: Vec<ReminderCandidate>,
    profiles: &dyn IProfileRepo,
    notifier: &dyn INotifier,
    options: &DispatchOptions,
    cancel: &CancellationToken,
) -> DispatchResult {
    let batches = group_by_owner(due);
    if batches.is_empty() {
        return DispatchResult::default();
    }
    let io_timeout = options.io_timeout;

    stream::iter(batches)
        .map(|batch| async move {
            if cancel.is_cancelled() {
                return UserOutcome::Failed(batch.owner_id, FailureReason::Cancelled);
            }
            resolve_and_notify(batch, profiles, notifier, io_timeout).await
        })
        .buffer_unordered(options.concurrency.max(1))
        .fold(DispatchResult::default(), |mut result, outcome| async move {
            match outcome {
                UserOutcome::Sent(batch) => result.record_sent(&batch),
                UserOutcome::Failed(user_id, reason) => result.record_failure(user_id, reason),
            }
            result
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{CancellingNotifier, CountingProfileRepo};
    use taskflow_domain::{Priority, Profile};
    use taskflow_infra::InMemoryNotifier;

    fn options() -> DispatchOptions {
        DispatchOptions {
            io_timeout: Duration::from_millis(500),
            concurrency: 4,
        }
    }

    fn candidate(owner_id: ID, title: &str) -> ReminderCandidate {
        ReminderCandidate {
            id: ID::new(),
            title: title.into(),
            priority: Priority::High,
            due_date: None,
            owner_id,
            reminder_interval: Some(60),
            last_reminder_sent: None,
        }
    }

    async fn insert_profile(profiles: &CountingProfileRepo, user_id: ID, email: &str) {
        profiles
            .insert(&Profile {
                user_id,
                email: Some(email.into()),
                name: None,
            })
            .await
            .expect("To insert profile");
    }

    #[actix_web::main]
    #[test]
    async fn empty_due_list_makes_no_calls() {
        let profiles = CountingProfileRepo::default();
        let notifier = InMemoryNotifier::new();

        let result = dispatch(
            Vec::new(),
            &profiles,
            &notifier,
            &options(),
            &CancellationToken::new(),
        )
        .await;

        assert!(result.is_empty());
        assert_eq!(profiles.lookups(), 0);
        assert_eq!(notifier.attempts(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn one_message_per_user() {
        let profiles = CountingProfileRepo::default();
        let notifier = InMemoryNotifier::new();
        let user = ID::new();
        insert_profile(&profiles, user, "ada@example.com").await;
        let t1 = candidate(user, "Pay rent");
        let t2 = candidate(user, "Buy milk");

        let result = dispatch(
            vec![t1.clone(), t2.clone()],
            &profiles,
            &notifier,
            &options(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(result.sent_count, 1);
        assert_eq!(result.notified_task_ids.len(), 2);
        assert!(result.notified_task_ids.contains(&t1.id));
        assert!(result.notified_task_ids.contains(&t2.id));
        assert!(result.failed_users.is_empty());
        assert_eq!(profiles.lookups(), 1);

        let sent = notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].address, "ada@example.com");
        assert_eq!(sent[0].subject, "⏰ Task Reminder: 2 pending tasks");
        assert!(sent[0].html_body.contains("Pay rent"));
        assert!(sent[0].html_body.contains("Buy milk"));
        assert!(sent[0].html_body.contains("Hi there!"));
    }

    #[actix_web::main]
    #[test]
    async fn delivery_failure_is_isolated() {
        let profiles = CountingProfileRepo::default();
        let notifier = InMemoryNotifier::new();
        let user_a = ID::new();
        let user_b = ID::new();
        insert_profile(&profiles, user_a, "a@example.com").await;
        insert_profile(&profiles, user_b, "b@example.com").await;
        notifier.fail_for("a@example.com");
        let task_a = candidate(user_a, "A");
        let task_b = candidate(user_b, "B");

        let result = dispatch(
            vec![task_a.clone(), task_b.clone()],
            &profiles,
            &notifier,
            &options(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(result.sent_count, 1);
        assert!(result.notified_task_ids.contains(&task_b.id));
        assert!(!result.notified_task_ids.contains(&task_a.id));
        assert_eq!(
            result.failed_users.get(&user_a),
            Some(&FailureReason::DeliveryFailed)
        );
        assert_eq!(notifier.attempts(), 2);
    }

    #[actix_web::main]
    #[test]
    async fn unresolved_profiles_are_skipped() {
        let profiles = CountingProfileRepo::default();
        let notifier = InMemoryNotifier::new();
        let without_profile = ID::new();
        let without_email = ID::new();
        let broken_lookup = ID::new();
        let reachable = ID::new();
        profiles
            .insert(&Profile {
                user_id: without_email,
                email: None,
                name: Some("Bob".into()),
            })
            .await
            .unwrap();
        insert_profile(&profiles, broken_lookup, "broken@example.com").await;
        profiles.break_lookup_for(broken_lookup);
        insert_profile(&profiles, reachable, "ok@example.com").await;

        let reachable_task = candidate(reachable, "Reachable");
        let result = dispatch(
            vec![
                candidate(without_profile, "A"),
                candidate(without_email, "B"),
                candidate(broken_lookup, "C"),
                reachable_task.clone(),
            ],
            &profiles,
            &notifier,
            &options(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(result.sent_count, 1);
        assert_eq!(result.notified_task_ids.len(), 1);
        assert!(result.notified_task_ids.contains(&reachable_task.id));
        for user in &[without_profile, without_email, broken_lookup] {
            assert_eq!(
                result.failed_users.get(user),
                Some(&FailureReason::ProfileUnresolved)
            );
        }
        assert_eq!(notifier.attempts(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn slow_delivery_counts_as_failure() {
        let profiles = CountingProfileRepo::default();
        let notifier = InMemoryNotifier::with_delay(Duration::from_millis(200));
        let user = ID::new();
        insert_profile(&profiles, user, "slow@example.com").await;

        let opts = DispatchOptions {
            io_timeout: Duration::from_millis(20),
            concurrency: 1,
        };
        let result = dispatch(
            vec![candidate(user, "Slow")],
            &profiles,
            &notifier,
            &opts,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(result.sent_count, 0);
        assert!(result.notified_task_ids.is_empty());
        assert_eq!(
            result.failed_users.get(&user),
            Some(&FailureReason::DeliveryFailed)
        );
    }

    #[actix_web::main]
    #[test]
    async fn cancelled_run_starts_no_new_users() {
        let profiles = CountingProfileRepo::default();
        let notifier = InMemoryNotifier::new();
        let user = ID::new();
        insert_profile(&profiles, user, "ada@example.com").await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = dispatch(
            vec![candidate(user, "A")],
            &profiles,
            &notifier,
            &options(),
            &cancel,
        )
        .await;

        assert_eq!(result.failed_users.get(&user), Some(&FailureReason::Cancelled));
        assert!(result.notified_task_ids.is_empty());
        assert_eq!(profiles.lookups(), 0);
        assert_eq!(notifier.attempts(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn many_users_are_aggregated() {
        let profiles = CountingProfileRepo::default();
        let notifier = InMemoryNotifier::new();
        let mut due = Vec::new();
        for i in 0..20 {
            let user = ID::new();
            insert_profile(&profiles, user, &format!("user{}@example.com", i)).await;
            due.push(candidate(user, "First"));
            due.push(candidate(user, "Second"));
        }

        let result = dispatch(due, &profiles, &notifier, &options(), &CancellationToken::new()).await;

        assert_eq!(result.sent_count, 20);
        assert_eq!(result.notified_task_ids.len(), 40);
        assert!(result.failed_users.is_empty());
        assert_eq!(notifier.sent_messages().len(), 20);
    }

    #[actix_web::main]
    #[test]
    async fn cancelling_mid_run_keeps_delivered_users() {
        let profiles = CountingProfileRepo::default();
        let cancel = CancellationToken::new();
        let notifier = CancellingNotifier {
            inner: InMemoryNotifier::new(),
            cancel: cancel.clone(),
        };
        let user_a = ID::new();
        let user_b = ID::new();
        insert_profile(&profiles, user_a, "a@example.com").await;
        insert_profile(&profiles, user_b, "b@example.com").await;
        let task_a = candidate(user_a, "A");
        let task_b = candidate(user_b, "B");

        let opts = DispatchOptions {
            io_timeout: Duration::from_millis(500),
            concurrency: 1,
        };
        let result = dispatch(
            vec![task_a.clone(), task_b.clone()],
            &profiles,
            &notifier,
            &opts,
            &cancel,
        )
        .await;

        assert_eq!(result.sent_count, 1);
        assert!(result.notified_task_ids.contains(&task_a.id));
        assert!(!result.notified_task_ids.contains(&task_b.id));
        assert_eq!(result.failed_users.get(&user_b), Some(&FailureReason::Cancelled));
        assert_eq!(profiles.lookups(), 1);
        assert_eq!(notifier.inner.attempts(), 1);
    }
}
