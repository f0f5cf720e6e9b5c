use rusqlite::Connection;
use todoc_core::db::migrations::{apply_migrations, latest_version, MigrationReport};
use todoc_core::db::seed::seed_projects;
use todoc_core::db::{open_db, open_db_in_memory, open_store, DbError, StoreConfig};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "project");
    assert_table_exists(&conn, "task");

    let index_exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type = 'index' AND name = 'task_project_id_idx'
            );",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(index_exists, 1);
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todoc.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    assert_eq!(project_count(&conn_first), 3);
    drop(conn_first);

    let conn_second = open_store(&StoreConfig::file(&path)).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_eq!(project_count(&conn_second), 3);
}

#[test]
fn reseeding_is_idempotent_and_keeps_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("UPDATE project SET name = 'Renamed' WHERE id = 1;", [])
        .unwrap();

    assert_eq!(seed_projects(&conn).unwrap(), 0);
    assert_eq!(project_count(&conn), 3);
    let name: String = conn
        .query_row("SELECT name FROM project WHERE id = 1;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Renamed");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn migration_report_counts_applied_steps() {
    let mut conn = Connection::open_in_memory().unwrap();

    let first = apply_migrations(&mut conn).unwrap();
    assert_eq!(
        first,
        MigrationReport {
            from_version: 0,
            to_version: latest_version(),
            applied: latest_version() as usize,
        }
    );

    let second = apply_migrations(&mut conn).unwrap();
    assert_eq!(second.from_version, latest_version());
    assert_eq!(second.applied, 0);
}

#[test]
fn reopening_database_missing_project_index_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_index.db");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("DROP INDEX task_project_id_idx;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::MissingSchemaObject { kind, name } => {
            assert_eq!(kind, "index");
            assert_eq!(name, "task_project_id_idx");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn database_at_latest_version_without_tables_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "user_version", latest_version())
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::MissingSchemaObject {
            kind: "table",
            name: "project"
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn project_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM project;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
