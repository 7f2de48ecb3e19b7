//! Field validation shared by person and task write paths.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected input for a person or task mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Person name is blank after trim.
    BlankPersonName,
    /// Task name is blank after trim.
    BlankTaskName,
    /// Task due date was not provided or could not be parsed.
    MissingDueDate,
    /// Email value is blank or has no `@`.
    InvalidEmail(String),
    /// Task attribution references an email the owner does not have.
    UnknownAttributionEmail(String),
    /// Email cannot be dropped while tasks are still attributed to it.
    EmailInUse(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankPersonName => write!(f, "person name must not be blank"),
            Self::BlankTaskName => write!(f, "task name must not be blank"),
            Self::MissingDueDate => write!(f, "task submission date is required"),
            Self::InvalidEmail(value) => write!(f, "invalid email: `{value}`"),
            Self::UnknownAttributionEmail(value) => {
                write!(f, "email is not registered for this person: `{value}`")
            }
            Self::EmailInUse(value) => {
                write!(f, "email still has attributed tasks: `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims a display name, rejecting blank input with `blank_error`.
pub(crate) fn normalize_name(
    value: &str,
    blank_error: ValidationError,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(blank_error);
    }
    Ok(trimmed.to_string())
}

/// Normalizes an email list: trims, drops exact duplicates, keeps first-seen order.
pub fn normalize_emails<S: AsRef<str>>(emails: &[S]) -> Result<Vec<String>, ValidationError> {
    let mut normalized: Vec<String> = Vec::with_capacity(emails.len());
    for raw in emails {
        let email = normalize_email(raw.as_ref())?;
        if !normalized.contains(&email) {
            normalized.push(email);
        }
    }
    Ok(normalized)
}

/// Trims one email and checks its basic `local@domain` shape.
pub fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(trimmed.to_string())
        }
        _ => Err(ValidationError::InvalidEmail(trimmed.to_string())),
    }
}
