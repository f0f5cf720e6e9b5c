//! Schema versioning for the task store.
//!
//! # Responsibility
//! - List the schema steps this build knows, each with the objects it creates.
//! - Bring a connection up to the latest step inside one transaction.
//! - Confirm after every open that the objects the schema promises exist.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - `PRAGMA user_version` equals the last applied step.
//! - A database reporting the latest version but missing a promised table or
//!   index is rejected rather than used.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

/// Kind of `sqlite_master` entry a schema step promises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaObjectKind {
    Table,
    Index,
}

impl SchemaObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Index => "index",
        }
    }
}

struct SchemaStep {
    version: u32,
    label: &'static str,
    sql: &'static str,
    creates: &'static [(SchemaObjectKind, &'static str)],
}

const STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    label: "project_and_task_tables",
    sql: include_str!("0001_init.sql"),
    creates: &[
        (SchemaObjectKind::Table, "project"),
        (SchemaObjectKind::Table, "task"),
        (SchemaObjectKind::Index, "task_project_id_idx"),
    ],
}];

/// What one call to `apply_migrations` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Number of schema steps run; zero for an up-to-date database.
    pub applied: usize,
}

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Runs every pending schema step, then checks the resulting schema.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a
///   newer build.
/// - `DbError::MissingSchemaObject` when a table or index promised by an
///   applied step is absent.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = STEPS
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if !pending.is_empty() {
        let tx = conn.transaction()?;
        for step in &pending {
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
            info!(
                "event=db_migrate module=db status=step version={} label={}",
                step.version, step.label
            );
        }
        tx.commit()?;
    }

    verify_schema(conn, latest)?;

    let report = MigrationReport {
        from_version,
        to_version: latest,
        applied: pending.len(),
    };
    if report.applied > 0 {
        info!(
            "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
            report.from_version, report.to_version, report.applied
        );
    }
    Ok(report)
}

/// Reads `PRAGMA user_version`.
pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

pub(crate) fn schema_object_exists(
    conn: &Connection,
    kind: SchemaObjectKind,
    name: &str,
) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = ?1 AND name = ?2
        );",
        [kind.as_str(), name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn verify_schema(conn: &Connection, version: u32) -> DbResult<()> {
    for step in STEPS.iter().filter(|step| step.version <= version) {
        for &(kind, name) in step.creates {
            if !schema_object_exists(conn, kind, name)? {
                warn!(
                    "event=db_migrate module=db status=error error_code=schema_object_missing kind={} name={name}",
                    kind.as_str()
                );
                return Err(DbError::MissingSchemaObject {
                    kind: kind.as_str(),
                    name,
                });
            }
        }
    }
    Ok(())
}
