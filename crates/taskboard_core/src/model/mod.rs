//! Domain model for tracked people and their tasks.
//!
//! # Responsibility
//! - Define the canonical records shared by stores, backends and views.
//! - Own field-level validation so every write path enforces the same rules.
//!
//! # Invariants
//! - Every person and task is identified by a stable UUID.
//! - A task belongs to exactly one person; the link is the owner's id, never
//!   an embedded copy.

pub mod person;
pub mod task;
pub mod validation;
