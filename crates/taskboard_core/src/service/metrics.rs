//! Task metrics and chart series.
//!
//! # Responsibility
//! - Count completed, late and pending tasks for the selected person.
//! - Derive the completion percent and the bar/pie chart series.
//! - Narrow the input to one due month when a `MonthFilter` is set.
//!
//! # Invariants
//! - Metrics are recomputed from the task list on every call; nothing is
//!   cached.
//! - `completion_percent` counts every completed task, late or not, and is
//!   `0` for an empty list.

use crate::model::task::Task;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Chart bucket a task contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Completed,
    Late,
    Pending,
}

impl StatusCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Late => "Late",
            Self::Pending => "Pending",
        }
    }

    pub fn of(task: &Task) -> Self {
        match (task.completed, task.late) {
            (true, false) => Self::Completed,
            (true, true) => Self::Late,
            (false, _) => Self::Pending,
        }
    }
}

/// One bar or pie slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub category: StatusCategory,
    pub label: &'static str,
    pub value: usize,
}

/// Pie/donut chart: status slices plus the overall completion percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieChart {
    pub slices: Vec<ChartPoint>,
    pub completion_percent: u32,
}

/// Aggregate counts over one task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskMetrics {
    pub total: usize,
    /// Completed on time.
    pub completed: usize,
    /// Completed after the due instant.
    pub late: usize,
    pub pending: usize,
    pub completion_percent: u32,
}

impl TaskMetrics {
    pub fn compute(tasks: &[Task]) -> Self {
        Self::aggregate(tasks.iter())
    }

    /// Computes metrics over the tasks due in `filter`'s month, or all tasks.
    pub fn compute_filtered(tasks: &[Task], filter: Option<MonthFilter>) -> Self {
        match filter {
            Some(month) => Self::aggregate(
                tasks
                    .iter()
                    .filter(|task| month.contains(task.submission_date)),
            ),
            None => Self::compute(tasks),
        }
    }

    fn aggregate<'a>(tasks: impl Iterator<Item = &'a Task>) -> Self {
        let mut metrics = Self::default();
        for task in tasks {
            metrics.total += 1;
            match StatusCategory::of(task) {
                StatusCategory::Completed => metrics.completed += 1,
                StatusCategory::Late => metrics.late += 1,
                StatusCategory::Pending => metrics.pending += 1,
            }
        }
        metrics.completion_percent =
            rounded_percent(metrics.completed + metrics.late, metrics.total);
        metrics
    }

    /// Bar chart series in display order: Completed, Late, Pending.
    pub fn bar_series(&self) -> Vec<ChartPoint> {
        [
            (StatusCategory::Completed, self.completed),
            (StatusCategory::Late, self.late),
            (StatusCategory::Pending, self.pending),
        ]
        .into_iter()
        .map(|(category, value)| ChartPoint {
            category,
            label: category.label(),
            value,
        })
        .collect()
    }

    pub fn pie_chart(&self) -> PieChart {
        PieChart {
            slices: self.bar_series(),
            completion_percent: self.completion_percent,
        }
    }
}

/// Rounds `100 * part / total` half up; `0` when `total` is zero.
fn rounded_percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * part + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(100)
}

/// Calendar month narrowing the metrics input by due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthFilter {
    year: i32,
    month: u32,
}

impl MonthFilter {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthFilterError> {
        if !(1..=12).contains(&month) {
            return Err(MonthFilterError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl Display for MonthFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthFilter {
    type Err = MonthFilterError;

    /// Parses `YYYY-MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthFilterError::InvalidFormat(trimmed.to_string()))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| MonthFilterError::InvalidFormat(trimmed.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| MonthFilterError::InvalidFormat(trimmed.to_string()))?;
        Self::new(year, month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthFilterError {
    InvalidFormat(String),
    MonthOutOfRange(u32),
}

impl Display for MonthFilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(value) => write!(f, "expected YYYY-MM, got `{value}`"),
            Self::MonthOutOfRange(month) => write!(f, "month must be 1..=12, got {month}"),
        }
    }
}

impl Error for MonthFilterError {}

#[cfg(test)]
mod tests {
    use super::{rounded_percent, MonthFilter, MonthFilterError, StatusCategory, TaskMetrics};
    use crate::model::task::{NewTask, Task, TaskPatch};
    use chrono::{NaiveDate, Utc};

    fn task_due(year: i32, month: u32, day: u32) -> Task {
        let input = NewTask {
            name: "t".to_string(),
            due_date: NaiveDate::from_ymd_opt(year, month, day),
            ..NewTask::default()
        };
        Task::from_new(&input, Utc::now()).unwrap()
    }

    #[test]
    fn empty_list_has_zero_percent() {
        let metrics = TaskMetrics::compute(&[]);
        assert_eq!(metrics, TaskMetrics::default());
        assert_eq!(metrics.completion_percent, 0);
    }

    #[test]
    fn percent_uses_standard_rounding() {
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 8), 13);
        assert_eq!(rounded_percent(4, 4), 100);
    }

    #[test]
    fn counts_split_by_status() {
        let on_time = task_due(2025, 1, 1)
            .patched(&TaskPatch::completion(false))
            .unwrap();
        let late = task_due(2025, 1, 2)
            .patched(&TaskPatch::completion(true))
            .unwrap();
        let pending = task_due(2025, 1, 3);

        let metrics = TaskMetrics::compute(&[on_time, late, pending]);
        assert_eq!(metrics.total, 3);
        assert_eq!(metrics.completed, 1);
        assert_eq!(metrics.late, 1);
        assert_eq!(metrics.pending, 1);
        assert_eq!(metrics.completion_percent, 67);
    }

    #[test]
    fn bar_series_keeps_display_order() {
        let metrics = TaskMetrics::compute(&[task_due(2025, 1, 1)]);
        let labels: Vec<&str> = metrics.bar_series().iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["Completed", "Late", "Pending"]);
        assert_eq!(metrics.pie_chart().slices[2].category, StatusCategory::Pending);
        assert_eq!(metrics.pie_chart().slices[2].value, 1);
    }

    #[test]
    fn month_filter_narrows_input() {
        let tasks = vec![
            task_due(2025, 1, 15),
            task_due(2025, 2, 1),
            task_due(2024, 1, 15),
        ];
        let january: MonthFilter = "2025-01".parse().unwrap();
        assert_eq!(TaskMetrics::compute_filtered(&tasks, Some(january)).total, 1);
        assert_eq!(TaskMetrics::compute_filtered(&tasks, None).total, 3);
        assert_eq!(january.to_string(), "2025-01");
    }

    #[test]
    fn month_filter_rejects_bad_input() {
        assert_eq!(
            "2025-13".parse::<MonthFilter>().unwrap_err(),
            MonthFilterError::MonthOutOfRange(13)
        );
        assert!(matches!(
            "January".parse::<MonthFilter>(),
            Err(MonthFilterError::InvalidFormat(_))
        ));
    }
}
