//! Authorization policies for mutating dashboard actions.

use std::fmt::{Display, Formatter};

/// Mutating action submitted to the admin gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdminAction {
    AddPerson,
    RenamePerson,
    SetPersonEmails,
    RemovePerson,
    AddTask,
    UpdateTask,
    RemoveTask,
}

impl AdminAction {
    /// Stable id used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddPerson => "person_add",
            Self::RenamePerson => "person_rename",
            Self::SetPersonEmails => "person_set_emails",
            Self::RemovePerson => "person_remove",
            Self::AddTask => "task_add",
            Self::UpdateTask => "task_update",
            Self::RemoveTask => "task_remove",
        }
    }
}

impl Display for AdminAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability deciding whether one action may run.
pub trait AuthorizationPolicy {
    fn authorize(&self, action: AdminAction) -> bool;
}

impl<F: Fn(AdminAction) -> bool> AuthorizationPolicy for F {
    fn authorize(&self, action: AdminAction) -> bool {
        self(action)
    }
}

/// Policy approving every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AuthorizationPolicy for AllowAll {
    fn authorize(&self, _action: AdminAction) -> bool {
        true
    }
}

/// Policy rejecting every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl AuthorizationPolicy for DenyAll {
    fn authorize(&self, _action: AdminAction) -> bool {
        false
    }
}

/// Source of PIN answers, asked once per gated action.
///
/// Returning `None` means the prompt was dismissed.
pub trait PinPrompt {
    fn request_pin(&self, action: AdminAction) -> Option<String>;
}

impl<F: Fn(AdminAction) -> Option<String>> PinPrompt for F {
    fn request_pin(&self, action: AdminAction) -> Option<String> {
        self(action)
    }
}

/// Prompt answering every request with the same PIN.
#[derive(Debug, Clone)]
pub struct StaticPin(pub String);

impl PinPrompt for StaticPin {
    fn request_pin(&self, _action: AdminAction) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Policy comparing a prompted PIN against the configured one.
///
/// This is placeholder authorization: plain comparison, no hashing,
/// no attempt limit.
pub struct PinPolicy<P: PinPrompt> {
    expected_pin: String,
    prompt: P,
}

impl<P: PinPrompt> PinPolicy<P> {
    pub fn new(expected_pin: impl Into<String>, prompt: P) -> Self {
        Self {
            expected_pin: expected_pin.into(),
            prompt,
        }
    }
}

impl<P: PinPrompt> AuthorizationPolicy for PinPolicy<P> {
    fn authorize(&self, action: AdminAction) -> bool {
        self.prompt
            .request_pin(action)
            .is_some_and(|answer| answer.trim() == self.expected_pin)
    }
}
