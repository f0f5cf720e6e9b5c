//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/delete/list APIs over the `task` table.
//! - Translate constraint failures into semantic errors.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Deleting a missing or never-inserted task is a no-op.
//! - Listing returns storage order (ascending id, i.e. insertion order).
//! - Read paths reject undecodable rows but deliver every decodable row,
//!   including names written by other clients that fail `Task::validate()`.

use crate::db::DbError;
use crate::model::project::ProjectId;
use crate::model::task::{Task, TaskId, TaskValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    name,
    creation_timestamp
FROM task";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task/project persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Task input failed validation; nothing was written.
    Validation(TaskValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Insert referenced a project id that is not stored.
    UnknownProject(ProjectId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Connection runs with `foreign_keys=OFF`, so project references and
    /// cascades would not be enforced.
    ForeignKeysDisabled,
    /// Persisted data cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownProject(id) => write!(f, "project not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::ForeignKeysDisabled => write!(f, "connection has foreign_keys disabled"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for task persistence.
pub trait TaskRepository {
    /// Persists a new task and returns the store-assigned id.
    ///
    /// Any `id` already set on `task` is ignored.
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Deletes the row matching `task.id`; returns whether a row was removed.
    fn delete_task(&self, task: &Task) -> RepoResult<bool>;
    /// Returns every stored task in storage order.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn count_tasks(&self) -> RepoResult<u64>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection already known to be migrated.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking schema version, tables and that
    /// foreign keys are enforced.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        super::ensure_connection_ready(conn, &["project", "task"])?;
        let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
        if foreign_keys != 1 {
            return Err(RepoError::ForeignKeysDisabled);
        }
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO task (project_id, name, creation_timestamp) VALUES (?1, ?2, ?3);",
            params![task.project_id, task.name.as_str(), task.creation_timestamp],
        );
        match inserted {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                debug!(
                    "event=task_insert module=repo status=ok task_id={id} project_id={}",
                    task.project_id
                );
                Ok(id)
            }
            Err(err) if is_foreign_key_violation(&err) => {
                warn!(
                    "event=task_insert module=repo status=error error_code=unknown_project project_id={}",
                    task.project_id
                );
                Err(RepoError::UnknownProject(task.project_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn delete_task(&self, task: &Task) -> RepoResult<bool> {
        let Some(id) = task.id else {
            return Ok(false);
        };

        let changed = self
            .conn
            .execute("DELETE FROM task WHERE id = ?1;", [id])?;
        debug!("event=task_delete module=repo status=ok task_id={id} removed={changed}");
        Ok(changed > 0)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!("{TASK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn count_tasks(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM task;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative task count `{count}`")))
    }
}

/// Decodes one row. Name rules are enforced on insert only, so rows written
/// by other clients are delivered as stored.
fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;
    let creation_timestamp: i64 = row.get("creation_timestamp").map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid creation_timestamp for task {id} in task.creation_timestamp: {err}"
        ))
    })?;
    Ok(Task {
        id: Some(id),
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        creation_timestamp,
    })
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
