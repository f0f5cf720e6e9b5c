//! Core domain logic for the Todoc task list.
//! This crate owns the project catalog, the task store, the sort policy and
//! the write/subscription plumbing used by front ends.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sort;

pub use db::{StorageLocation, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{ArgbColor, Project, ProjectId};
pub use model::task::{now_epoch_ms, Task, TaskId, TaskValidationError};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::subscription::Subscription;
pub use service::task_list::{build_task_list, TaskListItem};
pub use service::task_service::{ServiceError, ServiceResult, TaskService};
pub use service::write_worker::{PendingWrite, WorkerStopped};
pub use sort::{sort_tasks, sorted_tasks, SortMethod};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
