//! Dashboard state service.
//!
//! # Responsibility
//! - Hold the people list, the selected person and that person's tasks.
//! - Route every mutation through the admin gate and the persistence
//!   backend.
//! - Expose derived reads: task status, metrics, chart series.
//!
//! # Invariants
//! - Mutations run in four steps: pure checks, then the gate, then the
//!   backend write, then the in-memory commit. Any failure before the
//!   commit leaves state unchanged.
//! - `tasks` always belongs to `selected`; it is empty when nothing is
//!   selected.
//! - `selected`, when set, names a person in `people`.
//!
//! Person and task mutations live in `person_store` and `task_store`.

use crate::gate::confirm::{ConfirmationRequest, Decision, RemovalTarget};
use crate::gate::policy::{AdminAction, AuthorizationPolicy};
use crate::model::person::{Person, PersonId};
use crate::model::task::{Task, TaskId};
use crate::model::validation::ValidationError;
use crate::repo::backend::{PersistenceBackend, RepoError};
use crate::service::clock::Clock;
use crate::service::lateness::{is_expired, task_status, TaskStatus};
use crate::service::metrics::{MonthFilter, TaskMetrics};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection notice shown when the admin gate denies an action.
pub const ADMIN_REJECTION_NOTICE: &str = "Only admin can perform this action";

/// Errors from dashboard operations. None of them is fatal; the service
/// stays usable after any of them.
#[derive(Debug)]
pub enum DashboardError {
    /// Input rejected; nothing changed.
    Validation(ValidationError),
    /// Admin gate denied the action; nothing changed.
    Unauthorized(AdminAction),
    PersonNotFound(PersonId),
    TaskNotFound(TaskId),
    /// Task operation attempted with no selected person.
    NoPersonSelected,
    /// Backend failed; in-memory state still matches the last confirmed write.
    Persistence(RepoError),
}

impl Display for DashboardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unauthorized(_) => f.write_str(ADMIN_REJECTION_NOTICE),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::NoPersonSelected => write!(f, "no person selected"),
            Self::Persistence(err) => write!(f, "could not save changes: {err}"),
        }
    }
}

impl Error for DashboardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for DashboardError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for DashboardError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PersonNotFound(id) => Self::PersonNotFound(id),
            RepoError::TaskNotFound(id) => Self::TaskNotFound(id),
            other => Self::Persistence(other),
        }
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Result of resolving a confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    Cancelled,
}

/// Person/task state over one persistence backend.
pub struct DashboardService<B, P, C>
where
    B: PersistenceBackend,
    P: AuthorizationPolicy,
    C: Clock,
{
    pub(crate) backend: B,
    pub(crate) policy: P,
    pub(crate) clock: C,
    pub(crate) people: Vec<Person>,
    pub(crate) selected: Option<PersonId>,
    pub(crate) tasks: Vec<Task>,
    month_filter: Option<MonthFilter>,
}

impl<B, P, C> DashboardService<B, P, C>
where
    B: PersistenceBackend,
    P: AuthorizationPolicy,
    C: Clock,
{
    /// Loads the people list and selects the first person, if any.
    pub fn open(backend: B, policy: P, clock: C) -> DashboardResult<Self> {
        let people = backend.load_people()?;
        let selected = people.first().map(|person| person.id);
        let tasks = match selected {
            Some(id) => backend.load_tasks(id)?,
            None => Vec::new(),
        };
        info!(
            "event=dashboard_open module=service status=ok backend={} people={} tasks={}",
            backend.backend_name(),
            people.len(),
            tasks.len()
        );
        Ok(Self {
            backend,
            policy,
            clock,
            people,
            selected,
            tasks,
            month_filter: None,
        })
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people.iter().find(|person| person.id == id)
    }

    pub fn selected_person(&self) -> Option<&Person> {
        self.selected.and_then(|id| self.person(id))
    }

    /// Tasks of the selected person, in backend order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Switches the selection and reloads that person's tasks.
    ///
    /// Read-only; the admin gate is not consulted.
    pub fn select_person(&mut self, id: PersonId) -> DashboardResult<()> {
        if self.person(id).is_none() {
            return Err(DashboardError::PersonNotFound(id));
        }
        let tasks = self.backend.load_tasks(id)?;
        self.selected = Some(id);
        self.tasks = tasks;
        info!(
            "event=person_select module=service status=ok person_id={id} tasks={}",
            self.tasks.len()
        );
        Ok(())
    }

    /// Re-reads people and the selected person's tasks from the backend.
    ///
    /// Keeps the current selection when it still exists, otherwise falls
    /// back to the first person.
    pub fn reload(&mut self) -> DashboardResult<()> {
        let people = self.backend.load_people()?;
        let selected = self
            .selected
            .filter(|id| people.iter().any(|person| person.id == *id))
            .or_else(|| people.first().map(|person| person.id));
        let tasks = match selected {
            Some(id) => self.backend.load_tasks(id)?,
            None => Vec::new(),
        };
        self.people = people;
        self.selected = selected;
        self.tasks = tasks;
        Ok(())
    }

    pub fn is_expired(&self, task: &Task) -> bool {
        is_expired(task, self.clock.now())
    }

    pub fn task_status(&self, task: &Task) -> TaskStatus {
        task_status(task, self.clock.now())
    }

    pub fn month_filter(&self) -> Option<MonthFilter> {
        self.month_filter
    }

    /// Restricts `metrics()` to tasks due in one month; `None` clears it.
    pub fn set_month_filter(&mut self, filter: Option<MonthFilter>) {
        self.month_filter = filter;
    }

    /// Metrics for the selected person's tasks under the month filter.
    pub fn metrics(&self) -> TaskMetrics {
        TaskMetrics::compute_filtered(&self.tasks, self.month_filter)
    }

    /// Builds a confirmation request for removing a person or a task.
    ///
    /// Nothing is gated or changed until the request is resolved.
    pub fn request_removal(&self, target: RemovalTarget) -> DashboardResult<ConfirmationRequest> {
        let subject = match target {
            RemovalTarget::Person(id) => self
                .person(id)
                .ok_or(DashboardError::PersonNotFound(id))?
                .name
                .clone(),
            RemovalTarget::Task { owner, task } => {
                if self.selected != Some(owner) {
                    return Err(DashboardError::PersonNotFound(owner));
                }
                self.task(task)
                    .ok_or(DashboardError::TaskNotFound(task))?
                    .name
                    .clone()
            }
        };
        Ok(ConfirmationRequest::new(target, subject))
    }

    /// Applies the decision for a pending removal.
    ///
    /// `Cancel` never touches state. `Confirm` runs the regular gated removal.
    pub fn resolve_removal(
        &mut self,
        request: ConfirmationRequest,
        decision: Decision,
    ) -> DashboardResult<RemovalOutcome> {
        if decision == Decision::Cancel {
            info!("event=removal_cancelled module=service status=ok");
            return Ok(RemovalOutcome::Cancelled);
        }
        match request.target() {
            RemovalTarget::Person(id) => self.remove_person(id)?,
            RemovalTarget::Task { owner, task } => {
                if self.selected != Some(owner) {
                    return Err(DashboardError::PersonNotFound(owner));
                }
                self.remove_task(task)?
            }
        }
        Ok(RemovalOutcome::Removed)
    }

    pub(crate) fn authorize(&self, action: AdminAction) -> DashboardResult<()> {
        if self.policy.authorize(action) {
            return Ok(());
        }
        warn!("event=admin_gate module=service status=denied action={action}");
        Err(DashboardError::Unauthorized(action))
    }

    /// Logs a backend failure and converts it into a dashboard error.
    pub(crate) fn persistence_failed(&self, action: AdminAction, err: RepoError) -> DashboardError {
        warn!(
            "event={action} module=service status=error backend={} error={err}",
            self.backend.backend_name()
        );
        DashboardError::from(err)
    }
}
