//! Core domain logic for Taskboard.
//! This crate is the single source of truth for person/task invariants.

pub mod config;
pub mod db;
pub mod gate;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BackendKind, ConfigError, DashboardConfig};
pub use gate::confirm::{ConfirmationRequest, Decision, RemovalTarget};
pub use gate::policy::{
    AdminAction, AllowAll, AuthorizationPolicy, DenyAll, PinPolicy, PinPrompt, StaticPin,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::person::{Person, PersonId};
pub use model::task::{NewTask, Task, TaskId, TaskPatch};
pub use model::validation::ValidationError;
pub use repo::backend::{PersistenceBackend, RepoError, RepoResult};
pub use repo::document_store::{Document, DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
pub use repo::kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::local_backend::LocalBackend;
pub use repo::remote_backend::RemoteBackend;
pub use service::clock::{Clock, ManualClock, SystemClock};
pub use service::dashboard::{
    DashboardError, DashboardResult, DashboardService, RemovalOutcome, ADMIN_REJECTION_NOTICE,
};
pub use service::lateness::{is_expired, task_status, TaskStatus};
pub use service::metrics::{ChartPoint, MonthFilter, PieChart, StatusCategory, TaskMetrics};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
