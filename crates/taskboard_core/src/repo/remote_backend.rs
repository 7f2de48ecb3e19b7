//! Remote persistence variant over a document store.
//!
//! # Responsibility
//! - Map people to `employees/<id>` documents holding `name` and `emails`.
//! - Map tasks to `employees/<id>/tasks/<taskId>` documents carrying
//!   `createdAt`.
//!
//! # Invariants
//! - The document id is the record id; bodies never repeat it.
//! - Tasks load ordered by `createdAt`, oldest first.
//! - Deleting an employee deletes its whole `tasks` sub-collection first,
//!   in one batch with the employee document.

use crate::model::person::{Person, PersonId};
use crate::model::task::{Task, TaskId};
use crate::repo::backend::{PersistenceBackend, RepoError, RepoResult};
use crate::repo::document_store::{Document, DocumentStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Top-level collection holding one document per person.
pub const EMPLOYEES_COLLECTION: &str = "employees";

/// Path of one employee's task sub-collection.
pub fn tasks_collection(owner: PersonId) -> String {
    format!("{EMPLOYEES_COLLECTION}/{owner}/tasks")
}

#[derive(Debug, Serialize, Deserialize)]
struct EmployeeBody {
    name: String,
    #[serde(default)]
    emails: Vec<String>,
}

/// Document-database style backend.
pub struct RemoteBackend<D: DocumentStore> {
    store: D,
}

impl<D: DocumentStore> RemoteBackend<D> {
    pub fn new(store: D) -> Self {
        Self { store }
    }

    fn employee_exists(&self, id: PersonId) -> RepoResult<bool> {
        Ok(self
            .store
            .get(EMPLOYEES_COLLECTION, &id.to_string())?
            .is_some())
    }

    fn task_exists(&self, owner: PersonId, id: TaskId) -> RepoResult<bool> {
        Ok(self
            .store
            .get(&tasks_collection(owner), &id.to_string())?
            .is_some())
    }
}

impl<D: DocumentStore> PersistenceBackend for RemoteBackend<D> {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    fn load_people(&self) -> RepoResult<Vec<Person>> {
        self.store
            .list(EMPLOYEES_COLLECTION)?
            .into_iter()
            .map(person_from_document)
            .collect()
    }

    fn create_person(&self, person: &Person) -> RepoResult<()> {
        if self.employee_exists(person.id)? {
            return Err(RepoError::InvalidData(format!(
                "employee document already exists: {}",
                person.id
            )));
        }
        self.store.set(
            EMPLOYEES_COLLECTION,
            &person.id.to_string(),
            &employee_body(person)?,
        )
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        if !self.employee_exists(person.id)? {
            return Err(RepoError::PersonNotFound(person.id));
        }
        self.store.set(
            EMPLOYEES_COLLECTION,
            &person.id.to_string(),
            &employee_body(person)?,
        )
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        if !self.employee_exists(id)? {
            return Err(RepoError::PersonNotFound(id));
        }
        let collection = tasks_collection(id);
        let tasks = self.store.list(&collection)?;
        self.store.atomic(&mut || {
            for task in &tasks {
                self.store.delete(&collection, &task.id)?;
            }
            self.store.delete(EMPLOYEES_COLLECTION, &id.to_string())
        })
    }

    fn load_tasks(&self, owner: PersonId) -> RepoResult<Vec<Task>> {
        let collection = tasks_collection(owner);
        let mut tasks = self
            .store
            .list(&collection)?
            .into_iter()
            .map(|document| task_from_document(&collection, document))
            .collect::<RepoResult<Vec<_>>>()?;
        tasks.sort_by_key(|task| task.created_at);
        Ok(tasks)
    }

    fn create_task(&self, owner: PersonId, task: &Task) -> RepoResult<()> {
        if !self.employee_exists(owner)? {
            return Err(RepoError::PersonNotFound(owner));
        }
        if self.task_exists(owner, task.id)? {
            return Err(RepoError::InvalidData(format!(
                "task document already exists: {}",
                task.id
            )));
        }
        self.store.set(
            &tasks_collection(owner),
            &task.id.to_string(),
            &task_body(task)?,
        )
    }

    fn update_task(&self, owner: PersonId, task: &Task) -> RepoResult<()> {
        if !self.task_exists(owner, task.id)? {
            return Err(RepoError::TaskNotFound(task.id));
        }
        self.store.set(
            &tasks_collection(owner),
            &task.id.to_string(),
            &task_body(task)?,
        )
    }

    fn delete_task(&self, owner: PersonId, id: TaskId) -> RepoResult<()> {
        if !self.task_exists(owner, id)? {
            return Err(RepoError::TaskNotFound(id));
        }
        self.store.delete(&tasks_collection(owner), &id.to_string())
    }
}

fn employee_body(person: &Person) -> RepoResult<Value> {
    Ok(serde_json::to_value(EmployeeBody {
        name: person.name.clone(),
        emails: person.emails.clone(),
    })?)
}

fn person_from_document(document: Document) -> RepoResult<Person> {
    let id = parse_document_id(EMPLOYEES_COLLECTION, &document.id)?;
    let body: EmployeeBody = serde_json::from_value(document.body).map_err(|err| {
        RepoError::InvalidData(format!("employee `{id}` has an invalid body: {err}"))
    })?;
    let person = Person::with_id(id, &body.name)
        .and_then(|person| person.with_emails(body.emails.as_slice()))
        .map_err(|err| RepoError::InvalidData(format!("employee `{id}`: {err}")))?;
    Ok(person)
}

fn task_body(task: &Task) -> RepoResult<Value> {
    let mut body = serde_json::to_value(task)?;
    if let Value::Object(fields) = &mut body {
        fields.remove("id");
    }
    Ok(body)
}

fn task_from_document(collection: &str, document: Document) -> RepoResult<Task> {
    let Document { id, mut body } = document;
    let task_id = parse_document_id(collection, &id)?;
    match &mut body {
        Value::Object(fields) => {
            fields.insert("id".to_string(), Value::String(task_id.to_string()));
        }
        _ => {
            return Err(RepoError::InvalidData(format!(
                "task document `{collection}/{id}` is not an object"
            )));
        }
    }
    serde_json::from_value(body).map_err(|err| {
        RepoError::InvalidData(format!(
            "task document `{collection}/{id}` has an invalid body: {err}"
        ))
    })
}

fn parse_document_id(collection: &str, id: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| {
        RepoError::InvalidData(format!("invalid document id `{id}` in `{collection}`"))
    })
}
