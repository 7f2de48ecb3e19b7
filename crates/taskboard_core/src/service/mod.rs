//! Dashboard use-case services.
//!
//! # Responsibility
//! - Orchestrate gate checks and backend writes into person/task operations.
//! - Keep the CLI decoupled from storage details.
//! - Derive lateness and metrics from current state.

pub mod clock;
pub mod dashboard;
pub mod lateness;
pub mod metrics;
pub mod person_store;
pub mod task_store;
