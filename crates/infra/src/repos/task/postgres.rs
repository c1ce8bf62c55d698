use super::ITaskRepo;
use crate::repos::{from_millis, to_millis};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use taskflow_domain::{Priority, ReminderCandidate, Task, ID};
use tracing::{error, warn};

pub struct PostgresTaskRepo {
    pool: PgPool,
}

impl PostgresTaskRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TaskRaw {
    task_uid: Uuid,
    user_uid: Uuid,
    title: String,
    description: Option<String>,
    completed: bool,
    priority: String,
    due_date: Option<NaiveDate>,
    created: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    reminder_enabled: bool,
    reminder_interval: Option<i64>,
    last_reminder_sent: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct ReminderCandidateRaw {
    task_uid: Uuid,
    user_uid: Uuid,
    title: String,
    priority: String,
    due_date: Option<NaiveDate>,
    reminder_interval: Option<i64>,
    last_reminder_sent: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRaw> for Task {
    type Error = anyhow::Error;

    fn try_from(raw: TaskRaw) -> Result<Self, Self::Error> {
        Ok(Task {
            id: raw.task_uid.into(),
            user_id: raw.user_uid.into(),
            title: raw.title,
            description: raw.description,
            completed: raw.completed,
            priority: raw.priority.parse()?,
            due_date: raw.due_date,
            created_at: to_millis(raw.created),
            completed_at: raw.completed_at.map(to_millis),
            reminder_enabled: raw.reminder_enabled,
            reminder_interval: raw.reminder_interval,
            last_reminder_sent: raw.last_reminder_sent.map(to_millis),
        })
    }
}

impl From<ReminderCandidateRaw> for ReminderCandidate {
    fn from(raw: ReminderCandidateRaw) -> Self {
        // The priority is only shown in the email, an unknown value
        // must not keep the task from being reminded
        let priority = raw.priority.parse::<Priority>().unwrap_or_else(|e| {
            warn!("Task {} has an invalid priority: {}", raw.task_uid, e);
            Priority::default()
        });
        ReminderCandidate {
            id: raw.task_uid.into(),
            title: raw.title,
            priority,
            due_date: raw.due_date,
            owner_id: raw.user_uid.into(),
            reminder_interval: raw.reminder_interval,
            last_reminder_sent: raw.last_reminder_sent.map(to_millis),
        }
    }
}

#[async_trait::async_trait]
impl ITaskRepo for PostgresTaskRepo {
    async fn insert(&self, task: &Task) -> anyhow::Result<()> {
        let completed_at = task.completed_at.map(from_millis).transpose()?;
        let last_reminder_sent = task.last_reminder_sent.map(from_millis).transpose()?;
        sqlx::query(
            r#"
            INSERT INTO tasks
            (task_uid, user_uid, title, description, completed, priority, due_date,
             created, completed_at, reminder_enabled, reminder_interval, last_reminder_sent)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(task.id.inner_ref())
        .bind(task.user_id.inner_ref())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(from_millis(task.created_at)?)
        .bind(completed_at)
        .bind(task.reminder_enabled)
        .bind(task.reminder_interval)
        .bind(last_reminder_sent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, task_id: &ID) -> Option<Task> {
        let raw = match sqlx::query_as::<_, TaskRaw>(
            r#"
            SELECT * FROM tasks AS t
            WHERE t.task_uid = $1
            "#,
        )
        .bind(task_id.inner_ref())
        .fetch_one(&self.pool)
        .await
        {
            Ok(raw) => raw,
            Err(_) => return None,
        };
        match Task::try_from(raw) {
            Ok(task) => Some(task),
            Err(e) => {
                error!("Unable to read task {}. Err: {:?}", task_id, e);
                None
            }
        }
    }

    async fn fetch_reminder_candidates(&self) -> anyhow::Result<Vec<ReminderCandidate>> {
        let candidates = sqlx::query_as::<_, ReminderCandidateRaw>(
            r#"
            SELECT t.task_uid, t.user_uid, t.title, t.priority, t.due_date,
                t.reminder_interval, t.last_reminder_sent
            FROM tasks AS t
            WHERE t.completed = false
                AND t.reminder_enabled = true
                AND t.reminder_interval IS NOT NULL
                AND t.reminder_interval > 0
            ORDER BY t.created ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates.into_iter().map(|c| c.into()).collect())
    }

    async fn mark_reminded(&self, task_ids: &[ID], at: i64) -> anyhow::Result<u64> {
        if task_ids.is_empty() {
            return Ok(0);
        }
        let task_ids = task_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        let res = sqlx::query(
            r#"
            UPDATE tasks
            SET last_reminder_sent = $1
            WHERE task_uid = ANY($2)
            "#,
        )
        .bind(from_millis(at)?)
        .bind(&task_ids)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }
}
