//! Task domain model.
//!
//! # Responsibility
//! - Define the unit of work assigned to one person.
//! - Apply partial updates while keeping the completion/lateness invariant.
//!
//! # Invariants
//! - `late` is decided in the same update that sets `completed` to true and
//!   is frozen afterwards.
//! - Reopening a task (`completed` back to false) clears `late`.
//! - `expired` is never stored; see `service::lateness`.
//!
//! Field names serialize in camelCase (`submissionDate`, `showMore`,
//! `createdAt`) to keep the stored records compatible with browser storage.

use crate::model::validation::{normalize_name, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task, unique within its owner's task set.
pub type TaskId = Uuid;

/// Characters of description shown while a task is collapsed.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 35;

/// Unit of work with a due date and completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date. Compared against the clock at 00:00 UTC.
    pub submission_date: NaiveDate,
    pub completed: bool,
    /// Meaningful only when `completed` is true.
    #[serde(default)]
    pub late: bool,
    /// Whether the full description is shown.
    #[serde(default, rename = "showMore")]
    pub expanded: bool,
    /// Attribution to one of the owner's emails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for task creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    /// `None` models an empty date field and is rejected.
    pub due_date: Option<NaiveDate>,
    pub email: Option<String>,
}

/// Partial update merged into an existing task.
///
/// Outer `None` leaves a field untouched; for optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub submission_date: Option<NaiveDate>,
    pub completed: Option<bool>,
    /// Honored only together with a `completed: false -> true` transition.
    /// `DashboardService::update_task` overwrites it from its clock.
    pub late: Option<bool>,
    pub expanded: Option<bool>,
    pub email: Option<Option<String>>,
}

impl TaskPatch {
    /// Patch used by the "mark done" action.
    pub fn completion(late: bool) -> Self {
        Self {
            completed: Some(true),
            late: Some(late),
            ..Self::default()
        }
    }

    pub fn expanded(expanded: bool) -> Self {
        Self {
            expanded: Some(expanded),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Task {
    /// Builds a fresh, incomplete task from creation input.
    ///
    /// Attribution against the owner's emails is checked by the caller,
    /// which knows the owner.
    pub fn from_new(input: &NewTask, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let name = normalize_name(&input.name, ValidationError::BlankTaskName)?;
        let submission_date = input.due_date.ok_or(ValidationError::MissingDueDate)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: normalize_description(input.description.as_deref()),
            submission_date,
            completed: false,
            late: false,
            expanded: false,
            email: input.email.as_deref().map(str::trim).map(str::to_string),
            created_at: Some(created_at),
        })
    }

    /// Returns a copy with `patch` merged in.
    pub fn patched(&self, patch: &TaskPatch) -> Result<Self, ValidationError> {
        let mut next = self.clone();

        if let Some(name) = &patch.name {
            next.name = normalize_name(name, ValidationError::BlankTaskName)?;
        }
        if let Some(description) = &patch.description {
            next.description = normalize_description(description.as_deref());
        }
        if let Some(date) = patch.submission_date {
            next.submission_date = date;
        }
        if let Some(expanded) = patch.expanded {
            next.expanded = expanded;
        }
        if let Some(email) = &patch.email {
            next.email = email.as_deref().map(str::trim).map(str::to_string);
        }

        let completed = patch.completed.unwrap_or(self.completed);
        match (self.completed, completed) {
            (false, true) => {
                next.completed = true;
                next.late = patch.late.unwrap_or(false);
            }
            (true, false) => {
                next.completed = false;
                next.late = false;
            }
            _ => {}
        }

        Ok(next)
    }

    /// Instant the task becomes overdue: the due date at 00:00 UTC.
    pub fn due_instant(&self) -> DateTime<Utc> {
        self.submission_date.and_time(NaiveTime::MIN).and_utc()
    }

    /// Description as displayed: full when expanded, otherwise a short prefix.
    pub fn description_preview(&self) -> Option<String> {
        let description = self.description.as_deref()?;
        if self.expanded {
            return Some(description.to_string());
        }
        Some(description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect())
    }

    /// Whether the collapsed preview hides part of the description.
    pub fn has_more_description(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|value| value.chars().count() > DESCRIPTION_PREVIEW_CHARS)
    }
}

fn normalize_description(value: Option<&str>) -> Option<String> {
    value
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{NewTask, Task, TaskPatch, DESCRIPTION_PREVIEW_CHARS};
    use crate::model::validation::ValidationError;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample() -> Task {
        let input = NewTask {
            name: "Report".to_string(),
            description: Some("x".repeat(50)),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            email: None,
        };
        Task::from_new(&input, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn from_new_requires_name_and_due_date() {
        let missing_date = NewTask {
            name: "Report".to_string(),
            ..NewTask::default()
        };
        assert_eq!(
            Task::from_new(&missing_date, Utc::now()).unwrap_err(),
            ValidationError::MissingDueDate
        );

        let blank_name = NewTask {
            name: "  ".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..NewTask::default()
        };
        assert_eq!(
            Task::from_new(&blank_name, Utc::now()).unwrap_err(),
            ValidationError::BlankTaskName
        );
    }

    #[test]
    fn blank_description_is_stored_as_none() {
        let input = NewTask {
            name: "Report".to_string(),
            description: Some("   ".to_string()),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            email: None,
        };
        let task = Task::from_new(&input, Utc::now()).unwrap();
        assert!(task.description.is_none());
    }

    #[test]
    fn late_is_only_set_during_completion() {
        let task = sample();
        let stray_late = TaskPatch {
            late: Some(true),
            ..TaskPatch::default()
        };
        assert!(!task.patched(&stray_late).unwrap().late);

        let done_late = task.patched(&TaskPatch::completion(true)).unwrap();
        assert!(done_late.completed);
        assert!(done_late.late);

        let recomplete = done_late.patched(&TaskPatch::completion(false)).unwrap();
        assert!(recomplete.late, "late must stay frozen once completed");
    }

    #[test]
    fn reopening_clears_late() {
        let done_late = sample().patched(&TaskPatch::completion(true)).unwrap();
        let reopened = done_late
            .patched(&TaskPatch {
                completed: Some(false),
                ..TaskPatch::default()
            })
            .unwrap();
        assert!(!reopened.completed);
        assert!(!reopened.late);
    }

    #[test]
    fn due_instant_is_midnight_utc() {
        let task = sample();
        assert_eq!(
            task.due_instant(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn description_preview_respects_expansion() {
        let task = sample();
        assert!(task.has_more_description());
        assert_eq!(
            task.description_preview().unwrap().chars().count(),
            DESCRIPTION_PREVIEW_CHARS
        );

        let expanded = task.patched(&TaskPatch::expanded(true)).unwrap();
        assert_eq!(expanded.description_preview().unwrap().chars().count(), 50);
    }

    #[test]
    fn serializes_with_storage_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["submissionDate"], "2025-01-01");
        assert_eq!(json["showMore"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("email").is_none());
    }
}
