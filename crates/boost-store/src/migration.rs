//! Schema versioning for the SQLite store.
//!
//! Applied versions are recorded in `schema_migrations`; opening a file runs
//! every step between the recorded version and [`CURRENT_VERSION`] in one
//! transaction.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Schema version this build reads and writes.
pub const CURRENT_VERSION: u32 = 1;

/// Tables and indexes of schema v1.
///
/// `AUTOINCREMENT` keeps ids monotonic: SQLite never hands out an id at or
/// below the largest one ever used, even after that row is deleted.
const SCHEMA_V1: &str = r#"
    -- Records: one vocabulary entry per key, ordered by id
    CREATE TABLE records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT NOT NULL UNIQUE,
        value TEXT NOT NULL,
        is_checked INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL,      -- Unix microseconds
        updated_at INTEGER NOT NULL
    );

    -- Events: append-only audit log, cascade-deleted by the store
    CREATE TABLE events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_type TEXT NOT NULL CHECK (event_type IN ('SUCCESS', 'FAILURE', 'HINT')),
        record_id INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE INDEX idx_events_record ON events(record_id, id);
"#;

/// Bring the schema of `conn` up to [`CURRENT_VERSION`].
///
/// A file already at the current version is left alone. A file written by a
/// newer schema is refused.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in current + 1..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_micros()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Drop the data tables and create them again, empty.
///
/// Used by bulk import. Runs on whatever transaction the caller holds, so the
/// reset and the following inserts commit together.
pub fn reset(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP INDEX IF EXISTS idx_events_record;
         DROP TABLE IF EXISTS events;
         DROP TABLE IF EXISTS records;",
    )?;
    conn.execute_batch(SCHEMA_V1)?;
    Ok(())
}

/// Run the step that produces schema `version`.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        other => Err(StoreError::Migration(format!("no migration to schema v{other}"))),
    }
}

/// v1: records and events.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_V1)?;
    Ok(())
}

fn now_micros() -> i64 {
    boost_core::canonical::to_micros(&boost_core::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_migrate_creates_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables = table_names(&conn);
        for table in ["events", "records", "schema_migrations"] {
            assert!(tables.iter().any(|name| name == table), "missing {table}");
        }
    }

    #[test]
    fn test_migrate_twice_records_one_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (99, 0)",
            [],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }

    #[test]
    fn test_reset_empties_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO records (key, value, created_at, updated_at) VALUES ('foo', 'bar', 0, 0)",
            [],
        )
        .unwrap();

        reset(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        assert!(table_names(&conn).contains(&"events".to_string()));
    }

    #[test]
    fn test_event_type_is_constrained() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let result = conn.execute(
            "INSERT INTO events (event_type, record_id, created_at, updated_at)
             VALUES ('MAYBE', 1, 0, 0)",
            [],
        );
        assert!(result.is_err());
    }
}
