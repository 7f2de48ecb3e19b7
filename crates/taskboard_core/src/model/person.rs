//! Person domain model.
//!
//! # Responsibility
//! - Define the tracked individual (student or employee) that owns tasks.
//!
//! # Invariants
//! - `id` is stable and never reused for another person.
//! - `name` is trimmed and never blank.
//! - `emails` holds normalized, duplicate-free entries in insertion order.

use crate::model::validation::{normalize_emails, normalize_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a tracked person.
pub type PersonId = Uuid;

/// A tracked individual owning a set of tasks.
///
/// Tasks are not embedded; backends store them under the owner's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Addresses tasks may be attributed to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
}

impl Person {
    /// Creates a person with a generated id and no emails.
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a person with a caller-provided id.
    ///
    /// Used by backends rebuilding records whose identity already exists.
    pub fn with_id(id: PersonId, name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: normalize_name(name, ValidationError::BlankPersonName)?,
            emails: Vec::new(),
        })
    }

    /// Returns a copy carrying `new_name`, validated.
    pub fn renamed(&self, new_name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_name(new_name, ValidationError::BlankPersonName)?,
            ..self.clone()
        })
    }

    /// Returns a copy carrying the normalized `emails`.
    pub fn with_emails<S: AsRef<str>>(&self, emails: &[S]) -> Result<Self, ValidationError> {
        Ok(Self {
            emails: normalize_emails(emails)?,
            ..self.clone()
        })
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.emails.iter().any(|known| known == email)
    }
}
