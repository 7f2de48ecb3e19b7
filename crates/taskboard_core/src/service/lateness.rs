//! Lateness evaluation for tasks.
//!
//! `expired` is derived from the due date on every read and never stored.
//! `late` is the frozen copy of `expired` taken when a task is completed.

use crate::model::task::Task;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Whether an incomplete task's due instant has passed.
///
/// The boundary is exclusive: at exactly the due instant the task is not
/// yet expired.
pub fn is_expired(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.due_instant() < now
}

/// Display status of one task at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    CompletedLate,
    DeadlineMissed,
    Pending,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::CompletedLate => "Completed Late",
            Self::DeadlineMissed => "Deadline Missed",
            Self::Pending => "Pending",
        }
    }
}

pub fn task_status(task: &Task, now: DateTime<Utc>) -> TaskStatus {
    match (task.completed, task.late) {
        (true, false) => TaskStatus::Completed,
        (true, true) => TaskStatus::CompletedLate,
        (false, _) if is_expired(task, now) => TaskStatus::DeadlineMissed,
        (false, _) => TaskStatus::Pending,
    }
}
