//! Backend contract shared by the local and remote persistence variants.

use crate::db::DbError;
use crate::model::person::{Person, PersonId};
use crate::model::task::{Task, TaskId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for backend and raw-store operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    PersonNotFound(PersonId),
    TaskNotFound(TaskId),
    /// Stored data could not be interpreted.
    InvalidData(String),
    /// The store could not be reached or refused the write.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "serialization failed: {err}"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Storage contract for people and their tasks.
///
/// Methods take `&self`; implementations hold their own storage handle.
pub trait PersistenceBackend {
    /// Short name used in log events (`local`, `remote`).
    fn backend_name(&self) -> &'static str;

    fn load_people(&self) -> RepoResult<Vec<Person>>;
    fn create_person(&self, person: &Person) -> RepoResult<()>;
    fn update_person(&self, person: &Person) -> RepoResult<()>;
    /// Deletes the person and every task stored under it.
    fn delete_person(&self, id: PersonId) -> RepoResult<()>;

    fn load_tasks(&self, owner: PersonId) -> RepoResult<Vec<Task>>;
    fn create_task(&self, owner: PersonId, task: &Task) -> RepoResult<()>;
    fn update_task(&self, owner: PersonId, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, owner: PersonId, id: TaskId) -> RepoResult<()>;
}

impl<B: PersistenceBackend + ?Sized> PersistenceBackend for Box<B> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn load_people(&self) -> RepoResult<Vec<Person>> {
        (**self).load_people()
    }

    fn create_person(&self, person: &Person) -> RepoResult<()> {
        (**self).create_person(person)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        (**self).update_person(person)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        (**self).delete_person(id)
    }

    fn load_tasks(&self, owner: PersonId) -> RepoResult<Vec<Task>> {
        (**self).load_tasks(owner)
    }

    fn create_task(&self, owner: PersonId, task: &Task) -> RepoResult<()> {
        (**self).create_task(owner, task)
    }

    fn update_task(&self, owner: PersonId, task: &Task) -> RepoResult<()> {
        (**self).update_task(owner, task)
    }

    fn delete_task(&self, owner: PersonId, id: TaskId) -> RepoResult<()> {
        (**self).delete_task(owner, id)
    }
}
