use chrono::{DateTime, Utc};
use serde::Serialize;
use taskboard_core::{
    task_status, ChartPoint, MonthFilter, Person, PersonId, PieChart, Task, TaskMetrics,
    TaskStatus,
};

const BAR_WIDTH: usize = 20;

#[derive(Serialize)]
pub struct PersonRow<'a> {
    #[serde(flatten)]
    pub person: &'a Person,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct TaskRow<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub status: TaskStatus,
    pub expired: bool,
}

#[derive(Serialize)]
pub struct StatsReport<'a> {
    pub person: &'a Person,
    pub month: Option<String>,
    pub metrics: TaskMetrics,
    pub bar: Vec<ChartPoint>,
    pub pie: PieChart,
}

pub fn person_rows(people: &[Person], selected: Option<PersonId>) -> Vec<PersonRow<'_>> {
    people
        .iter()
        .map(|person| PersonRow {
            person,
            selected: Some(person.id) == selected,
        })
        .collect()
}

pub fn task_rows(tasks: &[Task], now: DateTime<Utc>) -> Vec<TaskRow<'_>> {
    tasks
        .iter()
        .map(|task| {
            let status = task_status(task, now);
            TaskRow {
                task,
                status,
                expired: status == TaskStatus::DeadlineMissed,
            }
        })
        .collect()
}

pub fn stats_report<'a>(
    person: &'a Person,
    month: Option<MonthFilter>,
    metrics: TaskMetrics,
) -> StatsReport<'a> {
    StatsReport {
        person,
        month: month.map(|month| month.to_string()),
        metrics,
        bar: metrics.bar_series(),
        pie: metrics.pie_chart(),
    }
}

pub fn format_people(rows: &[PersonRow<'_>]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if row.selected { '*' } else { ' ' };
        let emails = if row.person.emails.is_empty() {
            String::new()
        } else {
            format!("  <{}>", row.person.emails.join(", "))
        };
        out.push_str(&format!(
            "{marker} {}  {}{emails}\n",
            short_id(&row.person.id.to_string()),
            row.person.name
        ));
    }
    out
}

pub fn format_task_list(rows: &[TaskRow<'_>], full: bool) -> String {
    let mut out = String::new();
    for row in rows {
        let task = row.task;
        let email = task
            .email
            .as_ref()
            .map(|email| format!("  ({email})"))
            .unwrap_or_default();
        out.push_str(&format!(
            "{} {}  {}  due {}{email}  [{}]\n",
            status_icon(row.status),
            short_id(&task.id.to_string()),
            task.name,
            task.submission_date,
            row.status.label()
        ));

        let description = if full {
            task.description.clone()
        } else {
            task.description_preview()
        };
        if let Some(text) = description {
            let ellipsis = if !full && !task.expanded && task.has_more_description() {
                "..."
            } else {
                ""
            };
            out.push_str(&format!("      {text}{ellipsis}\n"));
        }
    }
    out
}

pub fn format_person_summary(person: &Person, metrics: &TaskMetrics) -> String {
    let mut out = format!("Name:       {}\nId:         {}\n", person.name, person.id);
    if !person.emails.is_empty() {
        out.push_str(&format!("Emails:     {}\n", person.emails.join(", ")));
    }
    out.push_str(&format!(
        "Tasks:      {} ({} done, {} late, {} pending)\nCompletion: {}%\n",
        metrics.total, metrics.completed, metrics.late, metrics.pending, metrics.completion_percent
    ));
    out
}

pub fn format_stats(report: &StatsReport<'_>) -> String {
    let scope = report
        .month
        .as_deref()
        .map(|month| format!(" ({month})"))
        .unwrap_or_default();
    let mut out = format!(
        "{}{scope}: {} tasks\n",
        report.person.name, report.metrics.total
    );
    let peak = report
        .bar
        .iter()
        .map(|point| point.value)
        .max()
        .unwrap_or(0);
    for point in &report.bar {
        let width = if peak == 0 {
            0
        } else {
            point.value * BAR_WIDTH / peak
        };
        out.push_str(&format!(
            "{:<10} {:<width$} {}\n",
            point.label,
            "#".repeat(width),
            point.value,
            width = BAR_WIDTH
        ));
    }
    out.push_str(&format!(
        "Completion {}%\n",
        report.pie.completion_percent
    ));
    out
}

fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "[x]",
        TaskStatus::CompletedLate => "[!]",
        TaskStatus::DeadlineMissed => "[-]",
        TaskStatus::Pending => "[ ]",
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::{format_people, format_stats, format_task_list, person_rows, stats_report, task_rows};
    use chrono::{NaiveDate, TimeZone, Utc};
    use taskboard_core::{NewTask, Person, Task, TaskMetrics, TaskPatch};

    fn task(name: &str, description: Option<&str>) -> Task {
        let input = NewTask {
            name: name.to_string(),
            description: description.map(str::to_string),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            email: None,
        };
        Task::from_new(&input, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn selected_person_is_marked() {
        let alice = Person::new("Alice").unwrap();
        let bob = Person::new("Bob")
            .unwrap()
            .with_emails(&["bob@corp.io"])
            .unwrap();
        let people = vec![alice, bob.clone()];
        let text = format_people(&person_rows(&people, Some(bob.id)));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("  "));
        assert!(lines[1].starts_with("* "));
        assert!(lines[1].ends_with("Bob  <bob@corp.io>"));
    }

    #[test]
    fn task_list_shows_status_and_collapsed_description() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let overdue = task(
            "Report",
            Some("Summarize the quarterly results for the board meeting"),
        );
        let done = task("Essay", None)
            .patched(&TaskPatch::completion(false))
            .unwrap();
        let tasks = vec![overdue, done];

        let text = format_task_list(&task_rows(&tasks, now), false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[-]"));
        assert!(lines[0].ends_with("[Deadline Missed]"));
        assert_eq!(lines[1].trim(), "Summarize the quarterly results for...");
        assert!(lines[2].starts_with("[x]"));

        let full = format_task_list(&task_rows(&tasks, now), true);
        assert!(full.contains("board meeting"));
    }

    #[test]
    fn stats_scale_bars_to_largest_bucket() {
        let alice = Person::new("Alice").unwrap();
        let metrics = TaskMetrics {
            total: 3,
            completed: 2,
            late: 0,
            pending: 1,
            completion_percent: 67,
        };
        let report = stats_report(&alice, Some("2025-02".parse().unwrap()), metrics);
        let text = format_stats(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Alice (2025-02): 3 tasks");
        assert!(lines[1].starts_with("Completed  ####################"));
        assert!(lines[1].ends_with(" 2"));
        assert!(lines[3].starts_with("Pending    ##########"));
        assert_eq!(lines[4], "Completion 67%");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["month"], "2025-02");
        assert_eq!(json["pie"]["completion_percent"], 67);
        assert_eq!(json["bar"][1]["label"], "Late");
    }
}
