use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum InvalidPriorityError {
    #[error("Priority: {0} is not one of low, medium or high")]
    Unknown(String),
}

impl FromStr for Priority {
    type Err = InvalidPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(InvalidPriorityError::Unknown(s.to_string())),
        }
    }
}

/// A `Task` owned by a user. Only the fields read or written by the
/// reminder job carry any behaviour here, the rest is stored as is.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    /// The day the task itself is due. Not related to when reminders fire.
    pub due_date: Option<NaiveDate>,
    /// Timestamp in millis
    pub created_at: i64,
    /// Timestamp in millis
    pub completed_at: Option<i64>,
    pub reminder_enabled: bool,
    /// Minutes between two reminders for this task
    pub reminder_interval: Option<i64>,
    /// Timestamp in millis of the last reminder that was delivered for this task
    pub last_reminder_sent: Option<i64>,
}

impl Task {
    pub fn new(user_id: ID, title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: Default::default(),
            user_id,
            title: title.into(),
            description: None,
            completed: false,
            priority: Default::default(),
            due_date: None,
            created_at,
            completed_at: None,
            reminder_enabled: false,
            reminder_interval: None,
            last_reminder_sent: None,
        }
    }

    pub fn with_reminder(mut self, interval_minutes: i64) -> Self {
        self.reminder_enabled = true;
        self.reminder_interval = Some(interval_minutes);
        self
    }

    /// Whether this task belongs in the reminder candidate set
    pub fn is_reminder_candidate(&self) -> bool {
        !self.completed
            && self.reminder_enabled
            && matches!(self.reminder_interval, Some(interval) if interval > 0)
    }
}

impl Entity<ID> for Task {
    fn id(&self) -> ID {
        self.id
    }
}
