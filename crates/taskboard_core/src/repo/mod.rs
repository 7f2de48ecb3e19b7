//! Persistence backends for people and tasks.
//!
//! # Responsibility
//! - Define the `PersistenceBackend` contract the dashboard service writes
//!   through.
//! - Provide the local key-value backend and the remote document backend,
//!   each over a pluggable raw store.
//!
//! # Invariants
//! - A backend call either applies its whole write or returns an error.
//! - Deleting a person also deletes every task stored under that person.
//! - Backends return semantic errors (`PersonNotFound`, `TaskNotFound`) in
//!   addition to transport errors.

pub mod backend;
pub mod document_store;
pub mod kv_store;
pub mod local_backend;
pub mod remote_backend;
