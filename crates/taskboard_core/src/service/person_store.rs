//! Person mutations on the dashboard service.
//!
//! # Invariants
//! - A new person becomes the selection with an empty task list.
//! - Removing the selected person moves the selection to the first
//!   remaining person, or clears it.
//! - Removing a person cascades to its tasks in the backend.

use crate::gate::policy::{AdminAction, AuthorizationPolicy};
use crate::model::person::{Person, PersonId};
use crate::model::validation::ValidationError;
use crate::repo::backend::PersistenceBackend;
use crate::service::clock::Clock;
use crate::service::dashboard::{DashboardError, DashboardResult, DashboardService};
use log::info;

impl<B, P, C> DashboardService<B, P, C>
where
    B: PersistenceBackend,
    P: AuthorizationPolicy,
    C: Clock,
{
    /// Adds a person and selects it.
    pub fn add_person(&mut self, name: &str) -> DashboardResult<PersonId> {
        let person = Person::new(name)?;
        self.authorize(AdminAction::AddPerson)?;

        self.backend
            .create_person(&person)
            .map_err(|err| self.persistence_failed(AdminAction::AddPerson, err))?;

        let id = person.id;
        self.people.push(person);
        self.selected = Some(id);
        self.tasks.clear();
        info!(
            "event=person_add module=service status=ok backend={} person_id={id}",
            self.backend.backend_name()
        );
        Ok(id)
    }

    /// Renames a person in place; the selection keeps pointing at it.
    pub fn rename_person(&mut self, id: PersonId, new_name: &str) -> DashboardResult<()> {
        let current = self.person(id).ok_or(DashboardError::PersonNotFound(id))?;
        let renamed = current.renamed(new_name)?;
        self.authorize(AdminAction::RenamePerson)?;

        self.backend
            .update_person(&renamed)
            .map_err(|err| self.persistence_failed(AdminAction::RenamePerson, err))?;

        self.replace_person(renamed);
        info!("event=person_rename module=service status=ok person_id={id}");
        Ok(())
    }

    /// Replaces the emails tasks may be attributed to.
    ///
    /// # Errors
    /// - `Validation(EmailInUse)` when a task is still attributed to an
    ///   email missing from `emails`.
    pub fn set_person_emails<S: AsRef<str>>(
        &mut self,
        id: PersonId,
        emails: &[S],
    ) -> DashboardResult<()> {
        let current = self.person(id).ok_or(DashboardError::PersonNotFound(id))?;
        let updated = current.with_emails(emails)?;

        let owned_tasks = if self.selected == Some(id) {
            self.tasks.clone()
        } else {
            self.backend.load_tasks(id)?
        };
        if let Some(orphaned) = owned_tasks
            .iter()
            .filter_map(|task| task.email.as_deref())
            .find(|email| !updated.has_email(email))
        {
            return Err(ValidationError::EmailInUse(orphaned.to_string()).into());
        }

        self.authorize(AdminAction::SetPersonEmails)?;
        self.backend
            .update_person(&updated)
            .map_err(|err| self.persistence_failed(AdminAction::SetPersonEmails, err))?;

        let count = updated.emails.len();
        self.replace_person(updated);
        info!("event=person_set_emails module=service status=ok person_id={id} emails={count}");
        Ok(())
    }

    /// Removes a person together with its tasks.
    pub fn remove_person(&mut self, id: PersonId) -> DashboardResult<()> {
        if self.person(id).is_none() {
            return Err(DashboardError::PersonNotFound(id));
        }
        self.authorize(AdminAction::RemovePerson)?;

        let remaining: Vec<Person> = self
            .people
            .iter()
            .filter(|person| person.id != id)
            .cloned()
            .collect();
        let removing_selected = self.selected == Some(id);
        let fallback = if removing_selected {
            remaining.first().map(|person| person.id)
        } else {
            self.selected
        };
        // Read the fallback's tasks before deleting so a failed read leaves
        // everything in place.
        let fallback_tasks = match (removing_selected, fallback) {
            (true, Some(next)) => Some(self.backend.load_tasks(next)?),
            (true, None) => Some(Vec::new()),
            (false, _) => None,
        };

        self.backend
            .delete_person(id)
            .map_err(|err| self.persistence_failed(AdminAction::RemovePerson, err))?;

        self.people = remaining;
        self.selected = fallback;
        if let Some(tasks) = fallback_tasks {
            self.tasks = tasks;
        }
        info!(
            "event=person_remove module=service status=ok person_id={id} selection_moved={removing_selected}"
        );
        Ok(())
    }

    fn replace_person(&mut self, person: Person) {
        if let Some(slot) = self.people.iter_mut().find(|slot| slot.id == person.id) {
            *slot = person;
        }
    }
}
