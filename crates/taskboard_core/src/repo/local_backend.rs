//! Local persistence variant over a key-value store.
//!
//! # Responsibility
//! - Persist the people list under `people` and each person's tasks under
//!   `tasks_<personId>`, both as JSON arrays.
//!
//! # Invariants
//! - Every write rewrites the whole affected list.
//! - The `people` list never embeds tasks.
//! - A missing key reads as an empty list.
//! - Removing a person rewrites `people` and drops `tasks_<id>` atomically.

use crate::model::person::{Person, PersonId};
use crate::model::task::{Task, TaskId};
use crate::repo::backend::{PersistenceBackend, RepoError, RepoResult};
use crate::repo::kv_store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key holding the serialized people list.
pub const PEOPLE_KEY: &str = "people";

/// Key holding one person's serialized task list.
pub fn tasks_key(owner: PersonId) -> String {
    format!("tasks_{owner}")
}

/// Browser-storage style backend.
pub struct LocalBackend<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> LocalBackend<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Vec<T>> {
        match self.store.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|err| {
                RepoError::InvalidData(format!("key `{key}` does not hold a valid list: {err}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> RepoResult<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, &raw)
    }

    fn person_exists(&self, id: PersonId) -> RepoResult<bool> {
        let people: Vec<Person> = self.read_list(PEOPLE_KEY)?;
        Ok(people.iter().any(|person| person.id == id))
    }
}

impl<K: KeyValueStore> PersistenceBackend for LocalBackend<K> {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn load_people(&self) -> RepoResult<Vec<Person>> {
        self.read_list(PEOPLE_KEY)
    }

    fn create_person(&self, person: &Person) -> RepoResult<()> {
        let mut people: Vec<Person> = self.read_list(PEOPLE_KEY)?;
        if people.iter().any(|existing| existing.id == person.id) {
            return Err(RepoError::InvalidData(format!(
                "person id already stored: {}",
                person.id
            )));
        }
        people.push(person.clone());
        self.write_list(PEOPLE_KEY, &people)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        let mut people: Vec<Person> = self.read_list(PEOPLE_KEY)?;
        let slot = people
            .iter_mut()
            .find(|existing| existing.id == person.id)
            .ok_or(RepoError::PersonNotFound(person.id))?;
        *slot = person.clone();
        self.write_list(PEOPLE_KEY, &people)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        let mut people: Vec<Person> = self.read_list(PEOPLE_KEY)?;
        let before = people.len();
        people.retain(|person| person.id != id);
        if people.len() == before {
            return Err(RepoError::PersonNotFound(id));
        }
        self.store.atomic(&mut || {
            self.write_list(PEOPLE_KEY, &people)?;
            self.store.remove(&tasks_key(id))
        })
    }

    fn load_tasks(&self, owner: PersonId) -> RepoResult<Vec<Task>> {
        self.read_list(&tasks_key(owner))
    }

    fn create_task(&self, owner: PersonId, task: &Task) -> RepoResult<()> {
        if !self.person_exists(owner)? {
            return Err(RepoError::PersonNotFound(owner));
        }
        let key = tasks_key(owner);
        let mut tasks: Vec<Task> = self.read_list(&key)?;
        if tasks.iter().any(|existing| existing.id == task.id) {
            return Err(RepoError::InvalidData(format!(
                "task id already stored: {}",
                task.id
            )));
        }
        tasks.push(task.clone());
        self.write_list(&key, &tasks)
    }

    fn update_task(&self, owner: PersonId, task: &Task) -> RepoResult<()> {
        let key = tasks_key(owner);
        let mut tasks: Vec<Task> = self.read_list(&key)?;
        let slot = tasks
            .iter_mut()
            .find(|existing| existing.id == task.id)
            .ok_or(RepoError::TaskNotFound(task.id))?;
        *slot = task.clone();
        self.write_list(&key, &tasks)
    }

    fn delete_task(&self, owner: PersonId, id: TaskId) -> RepoResult<()> {
        let key = tasks_key(owner);
        let mut tasks: Vec<Task> = self.read_list(&key)?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(RepoError::TaskNotFound(id));
        }
        self.write_list(&key, &tasks)
    }
}
