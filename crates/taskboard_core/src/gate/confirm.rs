//! Confirmation protocol for destructive actions.
//!
//! A caller asks the service for a `ConfirmationRequest`, shows `message()`
//! however it likes, and hands the request back with a `Decision`. The
//! request is consumed on resolution, so one request resolves at most once.

use crate::model::person::PersonId;
use crate::model::task::TaskId;

/// What a pending confirmation would remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalTarget {
    Person(PersonId),
    Task { owner: PersonId, task: TaskId },
}

/// User answer to a confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

impl Decision {
    /// Maps a yes/no answer (`y`, `yes`, case-insensitive); anything else cancels.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Self::Confirm,
            _ => Self::Cancel,
        }
    }
}

/// Pending destructive action awaiting a decision.
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmationRequest {
    target: RemovalTarget,
    subject: String,
}

impl ConfirmationRequest {
    pub(crate) fn new(target: RemovalTarget, subject: impl Into<String>) -> Self {
        Self {
            target,
            subject: subject.into(),
        }
    }

    pub fn target(&self) -> RemovalTarget {
        self.target
    }

    /// Display name of the record that would be removed.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Prompt text for the confirm/cancel dialog.
    pub fn message(&self) -> String {
        match self.target {
            RemovalTarget::Person(_) => format!(
                "Delete \"{}\" and all of their tasks? This cannot be undone.",
                self.subject
            ),
            RemovalTarget::Task { .. } => {
                format!("Delete task \"{}\"? This cannot be undone.", self.subject)
            }
        }
    }
}
