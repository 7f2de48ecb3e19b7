//! Task mutations on the dashboard service, scoped to the selected person.
//!
//! # Invariants
//! - Every task operation requires a selected person.
//! - `late` is stamped from the clock at the moment of completion.
//! - An attribution email must be one of the owner's emails.

use crate::gate::policy::{AdminAction, AuthorizationPolicy};
use crate::model::person::PersonId;
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::model::validation::ValidationError;
use crate::repo::backend::PersistenceBackend;
use crate::service::clock::Clock;
use crate::service::dashboard::{DashboardError, DashboardResult, DashboardService};
use crate::service::lateness::is_expired;
use log::info;

impl<B, P, C> DashboardService<B, P, C>
where
    B: PersistenceBackend,
    P: AuthorizationPolicy,
    C: Clock,
{
    /// Adds a task for the selected person.
    pub fn add_task(&mut self, input: &NewTask) -> DashboardResult<TaskId> {
        let owner = self.selected_owner()?;
        let task = Task::from_new(input, self.clock.now())?;
        self.check_attribution(task.email.as_deref())?;
        self.authorize(AdminAction::AddTask)?;

        self.backend
            .create_task(owner, &task)
            .map_err(|err| self.persistence_failed(AdminAction::AddTask, err))?;

        let id = task.id;
        self.tasks.push(task);
        info!(
            "event=task_add module=service status=ok backend={} person_id={owner} task_id={id}",
            self.backend.backend_name()
        );
        Ok(id)
    }

    /// Merges `patch` into an existing task.
    ///
    /// When the patch completes an open task, `late` is evaluated against the
    /// service clock and any `late` carried by the patch is ignored.
    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> DashboardResult<()> {
        let owner = self.selected_owner()?;
        let current = self.task(id).ok_or(DashboardError::TaskNotFound(id))?;
        let updated = if !current.completed && patch.completed == Some(true) {
            let stamped = TaskPatch {
                late: Some(is_expired(current, self.clock.now())),
                ..patch.clone()
            };
            current.patched(&stamped)?
        } else {
            current.patched(patch)?
        };
        if matches!(patch.email, Some(Some(_))) {
            self.check_attribution(updated.email.as_deref())?;
        }
        self.authorize(AdminAction::UpdateTask)?;

        self.backend
            .update_task(owner, &updated)
            .map_err(|err| self.persistence_failed(AdminAction::UpdateTask, err))?;

        if let Some(slot) = self.tasks.iter_mut().find(|task| task.id == id) {
            *slot = updated;
        }
        info!("event=task_update module=service status=ok person_id={owner} task_id={id}");
        Ok(())
    }

    /// Marks a task done, freezing `late` from the current instant.
    ///
    /// Completing an already completed task changes nothing.
    pub fn complete_task(&mut self, id: TaskId) -> DashboardResult<()> {
        self.selected_owner()?;
        if self.task(id).ok_or(DashboardError::TaskNotFound(id))?.completed {
            return Ok(());
        }
        let done = TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        };
        self.update_task(id, &done)
    }

    /// Flips the description expansion flag.
    pub fn toggle_description(&mut self, id: TaskId) -> DashboardResult<()> {
        self.selected_owner()?;
        let expanded = self
            .task(id)
            .ok_or(DashboardError::TaskNotFound(id))?
            .expanded;
        self.update_task(id, &TaskPatch::expanded(!expanded))
    }

    /// Removes a task from the selected person.
    pub fn remove_task(&mut self, id: TaskId) -> DashboardResult<()> {
        let owner = self.selected_owner()?;
        if self.task(id).is_none() {
            return Err(DashboardError::TaskNotFound(id));
        }
        self.authorize(AdminAction::RemoveTask)?;

        self.backend
            .delete_task(owner, id)
            .map_err(|err| self.persistence_failed(AdminAction::RemoveTask, err))?;

        self.tasks.retain(|task| task.id != id);
        info!("event=task_remove module=service status=ok person_id={owner} task_id={id}");
        Ok(())
    }

    fn selected_owner(&self) -> DashboardResult<PersonId> {
        self.selected.ok_or(DashboardError::NoPersonSelected)
    }

    fn check_attribution(&self, email: Option<&str>) -> DashboardResult<()> {
        let Some(email) = email else {
            return Ok(());
        };
        let owner = self
            .selected_person()
            .ok_or(DashboardError::NoPersonSelected)?;
        if owner.has_email(email) {
            return Ok(());
        }
        Err(ValidationError::UnknownAttributionEmail(email.to_string()).into())
    }
}
