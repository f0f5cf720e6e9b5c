//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections from a `StoreConfig`.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations and project seeding before returning a
//!   usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied and the project
//!   catalog seeded.

use super::config::{StorageLocation, StoreConfig};
use super::migrations::apply_migrations;
use super::seed::seed_projects;
use super::DbResult;
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the database described by `config`.
///
/// # Side effects
/// - Performs connection bootstrap, migration checks and catalog seeding.
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(config: &StoreConfig) -> DbResult<Connection> {
    let mode = config.location.mode();
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match &config.location {
        StorageLocation::File(path) => Connection::open(path),
        StorageLocation::InMemory => Connection::open_in_memory(),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens a SQLite database file, applies pending migrations and seeds
/// the project catalog.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_store(&StoreConfig::file(path))
}

/// Opens a fresh in-memory database, migrated and seeded.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_store(&StoreConfig::in_memory())
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    let report = apply_migrations(conn)?;
    let seeded = seed_projects(conn)?;
    debug!(
        "event=db_bootstrap module=db status=ok schema_version={} migrations_applied={} projects_seeded={seeded}",
        report.to_version, report.applied
    );
    Ok(())
}
