//! Project catalog seeding.
//!
//! # Invariants
//! - Uses `INSERT OR IGNORE`, so running it on every open never duplicates
//!   or rewrites an existing row.

use super::DbResult;
use crate::model::project::Project;
use rusqlite::{params, Connection};

/// Inserts the fixed project catalog, skipping rows that already exist.
///
/// Returns the number of rows actually inserted.
pub fn seed_projects(conn: &Connection) -> DbResult<usize> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO project (id, name, color) VALUES (?1, ?2, ?3);")?;
    let mut inserted = 0;
    for project in Project::all() {
        inserted += stmt.execute(params![project.id, project.name, project.color.argb()])?;
    }
    if inserted > 0 {
        log::debug!("event=db_seed module=db status=ok inserted={inserted}");
    }
    Ok(inserted)
}
