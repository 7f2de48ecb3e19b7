//! Admin gate: authorization and confirmation contracts for mutations.
//!
//! # Responsibility
//! - Decide whether a mutating action may run (`AuthorizationPolicy`).
//! - Model destructive-action confirmation as an explicit request/decision
//!   exchange instead of a blocking dialog.
//!
//! # Invariants
//! - Every mutation asks the policy before staging any change.
//! - A denied or cancelled action leaves all state untouched.

pub mod confirm;
pub mod policy;
