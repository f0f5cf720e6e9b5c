//! Task domain model.
//!
//! # Responsibility
//! - Define the to-do record persisted by the task store.
//! - Validate user input before it reaches persistence.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on insert.
//! - `name` is non-empty after trimming whitespace.
//! - `creation_timestamp` is set once at construction, in Unix epoch
//!   milliseconds.

use crate::model::project::{Project, ProjectId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned primary key of a task row.
pub type TaskId = i64;

/// A user-created to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the store; `None` before insert.
    pub id: Option<TaskId>,
    pub project_id: ProjectId,
    pub name: String,
    /// Unix epoch milliseconds.
    pub creation_timestamp: i64,
}

/// Validation error for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Name is empty or whitespace only.
    EmptyName,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates an unsaved task stamped with the current time.
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self::with_timestamp(project_id, name, now_epoch_ms())
    }

    /// Creates an unsaved task with a caller-provided creation time.
    pub fn with_timestamp(
        project_id: ProjectId,
        name: impl Into<String>,
        creation_timestamp: i64,
    ) -> Self {
        Self {
            id: None,
            project_id,
            name: name.into(),
            creation_timestamp,
        }
    }

    /// Checks user-facing invariants before persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        Ok(())
    }

    /// Resolves the owning project from the catalog, if it is known.
    pub fn project(&self) -> Option<&'static Project> {
        Project::by_id(self.project_id)
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before the epoch yield `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, Task, TaskValidationError};

    #[test]
    fn new_task_has_no_id_and_a_timestamp() {
        let before = now_epoch_ms();
        let task = Task::new(1, "write report");
        assert_eq!(task.id, None);
        assert!(task.creation_timestamp >= before);
    }

    #[test]
    fn whitespace_only_name_is_rejected() {
        assert_eq!(
            Task::with_timestamp(1, "  \t", 0).validate(),
            Err(TaskValidationError::EmptyName)
        );
        assert_eq!(Task::with_timestamp(1, "", 0).validate(), Err(TaskValidationError::EmptyName));
        assert!(Task::with_timestamp(1, " ok ", 0).validate().is_ok());
    }

    #[test]
    fn project_lookup_tolerates_unknown_ids() {
        assert_eq!(Task::with_timestamp(1, "a", 0).project().map(|p| p.id), Some(1));
        assert!(Task::with_timestamp(42, "a", 0).project().is_none());
    }
}
