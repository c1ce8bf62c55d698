use crate::shared::entity::ID;
use crate::task::{Priority, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;

const MILLIS_PER_MINUTE: i64 = 1000 * 60;

/// A `ReminderCandidate` is the read-only projection of a `Task` that the
/// reminder job works on.
///
/// The task store is expected to only hand out candidates for incomplete tasks
/// with reminders enabled and a positive `reminder_interval`, but nothing here
/// relies on that: invalid candidates are simply never due.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderCandidate {
    pub id: ID,
    pub title: String,
    pub priority: Priority,
    /// The task's own due date, only used when rendering the reminder
    pub due_date: Option<NaiveDate>,
    /// The user that owns the task and receives the reminder
    pub owner_id: ID,
    /// Minutes between two reminders
    pub reminder_interval: Option<i64>,
    /// Timestamp in millis of the last delivered reminder. `None` means never reminded.
    pub last_reminder_sent: Option<i64>,
}

impl ReminderCandidate {
    /// The configured interval in millis, or `None` if the interval is missing
    /// or not positive.
    pub fn interval_millis(&self) -> Option<i64> {
        match self.reminder_interval {
            Some(minutes) if minutes > 0 => Some(minutes.saturating_mul(MILLIS_PER_MINUTE)),
            _ => None,
        }
    }

    /// The earliest timestamp at which this candidate is due again.
    /// Never reminded candidates are due from the beginning of time.
    pub fn next_reminder_at(&self) -> Option<i64> {
        let interval = self.interval_millis()?;
        match self.last_reminder_sent {
            Some(last) => Some(last.saturating_add(interval)),
            None => Some(i64::MIN),
        }
    }

    /// A candidate is due when at least a full interval has elapsed since the
    /// last reminder. The boundary is inclusive.
    pub fn is_due(&self, now: i64) -> bool {
        match self.next_reminder_at() {
            Some(next) => now >= next,
            None => false,
        }
    }
}

impl From<&Task> for ReminderCandidate {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            priority: task.priority,
            due_date: task.due_date,
            owner_id: task.user_id,
            reminder_interval: task.reminder_interval,
            last_reminder_sent: task.last_reminder_sent,
        }
    }
}

/// Computes which candidates should be reminded at `now`.
///
/// Pure: `now` is given by the caller and the relative order of `candidates`
/// is kept.
pub fn compute_due(candidates: Vec<ReminderCandidate>, now: i64) -> Vec<ReminderCandidate> {
    candidates.into_iter().filter(|c| c.is_due(now)).collect()
}

/// All the due candidates of one user. They end up in one single message.
#[derive(Debug, Clone, PartialEq)]
pub struct UserBatch {
    pub owner_id: ID,
    pub tasks: Vec<ReminderCandidate>,
}

impl UserBatch {
    pub fn task_ids(&self) -> impl Iterator<Item = ID> + '_ {
        self.tasks.iter().map(|t| t.id)
    }
}

/// Groups due candidates by owner. Owners are ordered by their first
/// appearance and every batch keeps the input order of its tasks.
pub fn group_by_owner(due: Vec<ReminderCandidate>) -> Vec<UserBatch> {
    let mut batches: Vec<UserBatch> = Vec::new();
    let mut batch_index: HashMap<ID, usize> = HashMap::new();

    for candidate in due {
        match batch_index.get(&candidate.owner_id) {
            Some(&index) => batches[index].tasks.push(candidate),
            None => {
                batch_index.insert(candidate.owner_id, batches.len());
                batches.push(UserBatch {
                    owner_id: candidate.owner_id,
                    tasks: vec![candidate],
                });
            }
        }
    }

    batches
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// No profile, no email address or the lookup failed
    ProfileUnresolved,
    /// The notifier did not confirm the delivery
    DeliveryFailed,
    /// The run was cancelled before this user was processed
    Cancelled,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileUnresolved => "profile-unresolved",
            Self::DeliveryFailed => "delivery-failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one reminder run. Only `notified_task_ids` is ever written back
/// to the task store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchResult {
    pub notified_task_ids: HashSet<ID>,
    pub failed_users: HashMap<ID, FailureReason>,
    pub sent_count: usize,
}

impl DispatchResult {
    pub fn record_sent(&mut self, batch: &UserBatch) {
        self.notified_task_ids.extend(batch.task_ids());
        self.sent_count += 1;
    }

    pub fn record_failure(&mut self, user_id: ID, reason: FailureReason) {
        self.failed_users.insert(user_id, reason);
    }

    pub fn is_empty(&self) -> bool {
        self.notified_task_ids.is_empty() && self.failed_users.is_empty() && self.sent_count == 0
    }
}
