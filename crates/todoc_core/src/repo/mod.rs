//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for the `task` and `project` tables.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Task writes enforce `Task::validate()` before persistence.
//! - Foreign-key violations surface as `RepoError::UnknownProject`, never as
//!   a partial write.

pub mod project_repo;
pub mod task_repo;

use crate::db::migrations::{
    current_user_version, latest_version, schema_object_exists, SchemaObjectKind,
};
use rusqlite::Connection;
use task_repo::{RepoError, RepoResult};

/// Verifies that `conn` is migrated and carries every table in `tables`.
pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !schema_object_exists(conn, SchemaObjectKind::Table, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
