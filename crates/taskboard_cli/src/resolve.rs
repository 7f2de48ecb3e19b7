//! Maps command-line references onto person and task ids.

use anyhow::{bail, Result};
use taskboard_core::{Person, PersonId, Task, TaskId};
use uuid::Uuid;

/// Shortest id prefix accepted for a task reference.
const MIN_ID_PREFIX: usize = 4;

/// Resolves a full person id or a unique, case-insensitive name.
pub fn resolve_person(people: &[Person], reference: &str) -> Result<PersonId> {
    let reference = reference.trim();
    if let Ok(id) = Uuid::parse_str(reference) {
        if people.iter().any(|person| person.id == id) {
            return Ok(id);
        }
    }

    let matches: Vec<&Person> = people
        .iter()
        .filter(|person| person.name.eq_ignore_ascii_case(reference))
        .collect();
    match matches.as_slice() {
        [person] => Ok(person.id),
        [] => bail!("no person matches '{reference}'"),
        _ => bail!("'{reference}' matches {} people; use the id", matches.len()),
    }
}

/// Resolves a full task id, a unique id prefix or a unique task name.
pub fn resolve_task(tasks: &[Task], reference: &str) -> Result<TaskId> {
    let reference = reference.trim();
    if let Ok(id) = Uuid::parse_str(reference) {
        if tasks.iter().any(|task| task.id == id) {
            return Ok(id);
        }
    }

    let lowered = reference.to_ascii_lowercase();
    if lowered.len() >= MIN_ID_PREFIX {
        let by_prefix: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.id.to_string().starts_with(&lowered))
            .collect();
        match by_prefix.as_slice() {
            [task] => return Ok(task.id),
            [] => {}
            _ => bail!("id prefix '{reference}' matches {} tasks", by_prefix.len()),
        }
    }

    let by_name: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.name.eq_ignore_ascii_case(reference))
        .collect();
    match by_name.as_slice() {
        [task] => Ok(task.id),
        [] => bail!("no task matches '{reference}'"),
        _ => bail!("'{reference}' matches {} tasks; use the id", by_name.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_person, resolve_task};
    use chrono::{NaiveDate, TimeZone, Utc};
    use taskboard_core::{NewTask, Person, Task};

    fn task(name: &str) -> Task {
        let input = NewTask {
            name: name.to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..NewTask::default()
        };
        Task::from_new(&input, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn person_by_id_or_name() {
        let alice = Person::new("Alice").unwrap();
        let bob = Person::new("Bob").unwrap();
        let people = vec![alice.clone(), bob.clone()];

        assert_eq!(resolve_person(&people, &bob.id.to_string()).unwrap(), bob.id);
        assert_eq!(resolve_person(&people, " alice ").unwrap(), alice.id);
        assert!(resolve_person(&people, "Carol").is_err());
    }

    #[test]
    fn duplicate_names_need_an_id() {
        let people = vec![Person::new("Sam").unwrap(), Person::new("sam").unwrap()];
        let err = resolve_person(&people, "Sam").unwrap_err();
        assert!(err.to_string().contains("2 people"));
    }

    #[test]
    fn task_by_prefix_or_name() {
        let report = task("Report");
        let essay = task("Essay");
        let tasks = vec![report.clone(), essay.clone()];

        let prefix = &report.id.to_string()[..8];
        assert_eq!(resolve_task(&tasks, prefix).unwrap(), report.id);
        assert_eq!(resolve_task(&tasks, "essay").unwrap(), essay.id);
        assert_eq!(
            resolve_task(&tasks, &essay.id.to_string().to_uppercase()).unwrap(),
            essay.id
        );
        assert!(resolve_task(&tasks, "Slides").is_err());
    }
}
