//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite
//! and keeps the whole database in one file (rollback journal, no WAL), so a
//! plain file copy is a complete snapshot.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use boost_core::canonical::{from_micros, to_micros, Timestamp};
use boost_core::{now, validate_key, Dataset, Event, EventId, EventType, Item, Record, RecordId};
use rusqlite::types::Type;
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

const RECORD_COLUMNS: &str = "id, key, value, is_checked, created_at, updated_at";
const EVENT_COLUMNS: &str = "id, event_type, record_id, created_at, updated_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. Every mutating method commits before it
/// returns.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Mutex<Connection>,
    /// Backing file, `None` for in-memory databases.
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist. Any failure
    /// to open, create or initialize the file is reported as
    /// [`StoreError::Unavailable`], and so is a file that can only be opened
    /// read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut conn = Connection::open(path)
            .and_then(|conn| configure(&conn).map(|()| conn))
            .map_err(|e| StoreError::unavailable(path, e))?;

        // SQLite falls back to read-only on a write-protected file
        let readonly = conn
            .is_readonly(DatabaseName::Main)
            .map_err(|e| StoreError::unavailable(path, e))?;
        if readonly {
            return Err(StoreError::unavailable(path, "database file is not writable"));
        }

        migration::migrate(&mut conn).map_err(|e| match e {
            StoreError::Database(err) => StoreError::unavailable(path, err),
            other => other,
        })?;

        info!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        configure(&conn)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// The backing file, or `None` for an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write a consistent physical copy of the database to `dest`.
    ///
    /// `dest` must not exist or must be an empty file.
    pub fn snapshot_into(&self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let target = dest.to_str().ok_or_else(|| {
            StoreError::unavailable(dest, "snapshot path is not valid UTF-8")
        })?;

        self.with_conn(|conn| {
            conn.execute("VACUUM INTO ?1", params![target])?;
            Ok(())
        })
        .map_err(|e| match e {
            StoreError::Database(err) => StoreError::unavailable(dest, err),
            other => other,
        })?;

        debug!(dest = %dest.display(), "wrote sqlite snapshot");
        Ok(())
    }

    /// Copy the database to `dest`, replacing any existing file atomically.
    ///
    /// The copy is staged next to `dest` and renamed into place, so `dest` is
    /// either the old file or the complete new one.
    pub fn persist_to(&self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let staging = tempfile::Builder::new()
            .prefix(".boost-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| StoreError::unavailable(dest, e))?
            .into_temp_path();

        self.snapshot_into(&staging)?;
        staging
            .persist(dest)
            .map_err(|e| StoreError::unavailable(dest, e.error))?;

        info!(dest = %dest.display(), "persisted sqlite store");
        Ok(())
    }

    /// Execute an operation on the connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Execute an operation that needs mutable access (transactions).
    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.lock()?;
        f(&mut conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA synchronous = FULL;")
}

fn record_id_by_key(conn: &Connection, key: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM records WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(StoreError::from)
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    let micros: i64 = row.get(idx)?;
    from_micros(micros)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

// Column order follows RECORD_COLUMNS.
fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: RecordId::new(row.get(0)?),
        key: row.get(1)?,
        value: row.get(2)?,
        is_checked: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
        updated_at: timestamp_column(row, 5)?,
    })
}

// Column order follows EVENT_COLUMNS.
fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    let raw_type: String = row.get(1)?;
    let event_type = raw_type
        .parse::<EventType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(Event {
        id: EventId::new(row.get(0)?),
        event_type,
        record_id: RecordId::new(row.get(2)?),
        created_at: timestamp_column(row, 3)?,
        updated_at: timestamp_column(row, 4)?,
    })
}

impl Store for SqliteStore {
    fn get_record(&self, key: &str) -> Result<Option<Record>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM records WHERE key = ?1"),
                params![key],
                row_to_record,
            )
            .optional()
            .map_err(StoreError::from)
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })
    }

    fn contains(&self, key: &str) -> Result<bool> {
        self.with_conn(|conn| Ok(record_id_by_key(conn, key)?.is_some()))
    }

    fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
            usize::try_from(count)
                .map_err(|_| StoreError::InvalidData(format!("negative record count {count}")))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<RecordId> {
        validate_key(key)?;
        let now = to_micros(&now());

        self.with_conn(|conn| {
            let id = match record_id_by_key(conn, key)? {
                Some(id) => {
                    conn.execute(
                        "UPDATE records SET value = ?2, updated_at = ?3 WHERE id = ?1",
                        params![id, value, now],
                    )?;
                    debug!(key, id, "updated record");
                    id
                }
                None => {
                    conn.execute(
                        "INSERT INTO records (key, value, is_checked, created_at, updated_at)
                         VALUES (?1, ?2, 1, ?3, ?3)",
                        params![key, value, now],
                    )?;
                    let id = conn.last_insert_rowid();
                    debug!(key, id, "inserted record");
                    id
                }
            };
            Ok(RecordId::new(id))
        })
    }

    fn rename(&self, old_key: &str, new_key: &str, value: &str) -> Result<()> {
        validate_key(new_key)?;
        let now = to_micros(&now());

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let id = record_id_by_key(&tx, old_key)?
                .ok_or_else(|| StoreError::NotFound(old_key.to_string()))?;

            if new_key != old_key && record_id_by_key(&tx, new_key)?.is_some() {
                return Err(StoreError::DuplicateKey(new_key.to_string()));
            }

            tx.execute(
                "UPDATE records SET key = ?2, value = ?3, updated_at = ?4 WHERE id = ?1",
                params![id, new_key, value, now],
            )?;
            tx.commit()?;

            debug!(old_key, new_key, id, "renamed record");
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let id = record_id_by_key(&tx, key)?
                .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

            let events = tx.execute("DELETE FROM events WHERE record_id = ?1", params![id])?;
            tx.execute("DELETE FROM records WHERE id = ?1", params![id])?;
            tx.commit()?;

            debug!(key, id, events, "deleted record");
            Ok(())
        })
    }

    fn is_checked(&self, key: &str) -> Result<bool> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT is_checked FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
        })
    }

    fn set_checked_flag(&self, key: &str, checked: bool) -> Result<()> {
        let now = to_micros(&now());

        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE records SET is_checked = ?2, updated_at = ?3 WHERE key = ?1",
                params![key, checked, now],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(key.to_string()));
            }
            debug!(key, checked, "set checked flag");
            Ok(())
        })
    }

    fn commit_event(&self, key: &str, event_type: EventType) -> Result<EventId> {
        let now = to_micros(&now());

        self.with_conn(|conn| {
            // Single statement: the record lookup and the append are atomic.
            let inserted = conn.execute(
                "INSERT INTO events (event_type, record_id, created_at, updated_at)
                 SELECT ?2, id, ?3, ?3 FROM records WHERE key = ?1",
                params![key, event_type.as_str(), now],
            )?;
            if inserted == 0 {
                return Err(StoreError::NotFound(key.to_string()));
            }

            let id = conn.last_insert_rowid();
            debug!(key, %event_type, id, "committed event");
            Ok(EventId::new(id))
        })
    }

    fn events(&self, key: &str) -> Result<Vec<Event>> {
        self.with_conn(|conn| {
            let record_id = record_id_by_key(conn, key)?
                .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE record_id = ?1 ORDER BY id"
            ))?;
            let events = stmt
                .query_map(params![record_id], row_to_event)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(events)
        })
    }

    fn all_events(&self) -> Result<Vec<Event>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id"))?;
            let events = stmt
                .query_map([], row_to_event)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(events)
        })
    }

    fn records(&self) -> Result<Vec<Record>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {RECORD_COLUMNS} FROM records ORDER BY id"))?;
            let records = stmt
                .query_map([], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM records ORDER BY id")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(keys)
        })
    }

    fn items(&self) -> Result<Vec<Item>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key, value, is_checked FROM records ORDER BY id")?;
            let items = stmt
                .query_map([], |row| {
                    Ok(Item {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        is_checked: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
    }

    fn import(&self, dataset: &Dataset) -> Result<()> {
        dataset.validate().map_err(StoreError::MalformedInput)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            migration::reset(&tx)?;

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO records (id, key, value, is_checked, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for record in &dataset.records {
                    stmt.execute(params![
                        record.id.get(),
                        record.key,
                        record.value,
                        record.is_checked,
                        to_micros(&record.created_at),
                        to_micros(&record.updated_at),
                    ])?;
                }
            }

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO events (id, event_type, record_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for event in &dataset.events {
                    stmt.execute(params![
                        event.id.get(),
                        event.event_type.as_str(),
                        event.record_id.get(),
                        to_micros(&event.created_at),
                        to_micros(&event.updated_at),
                    ])?;
                }
            }

            tx.commit()?;
            info!(
                records = dataset.records.len(),
                events = dataset.events.len(),
                "imported dataset"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use boost_core::ValidationError;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_memory().unwrap();
        for key in ["foo", "bar", "baz"] {
            store.set(key, &format!("{key}_value")).unwrap();
        }
        store
    }

    #[test]
    fn test_set_and_get() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.get("spam").unwrap(), None);

        store.set("spam", "eggs").unwrap();
        assert_eq!(store.get("spam").unwrap().as_deref(), Some("eggs"));
        assert!(store.contains("spam").unwrap());
        assert!(store.is_checked("spam").unwrap());
    }

    #[test]
    fn test_update_keeps_id_and_flag() {
        let store = SqliteStore::open_memory().unwrap();
        let id = store.set("spam", "eggs").unwrap();
        store.set_unchecked("spam").unwrap();

        let again = store.set("spam", "ham").unwrap();
        assert_eq!(id, again);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("spam").unwrap().as_deref(), Some("ham"));
        assert!(!store.is_checked("spam").unwrap());
    }

    #[test]
    fn test_empty_key_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(matches!(
            store.set("", "value"),
            Err(StoreError::InvalidArgument(ValidationError::EmptyKey))
        ));
    }

    #[test]
    fn test_rename_in_place() {
        let store = seeded();
        store.rename("foo", "foo_new", "spam").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["foo_new", "bar", "baz"]);
        assert_eq!(store.get("foo_new").unwrap().as_deref(), Some("spam"));
        assert_eq!(store.get("foo").unwrap(), None);
    }

    #[test]
    fn test_rename_errors() {
        let store = seeded();
        assert!(matches!(
            store.rename("missing", "x", "y"),
            Err(StoreError::NotFound(key)) if key == "missing"
        ));
        assert!(matches!(
            store.rename("foo", "bar", "y"),
            Err(StoreError::DuplicateKey(key)) if key == "bar"
        ));
        assert_eq!(store.keys().unwrap(), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_delete_cascades_events() {
        let store = seeded();
        for _ in 0..3 {
            store.commit_success_event("foo").unwrap();
        }
        store.commit_hint_event("bar").unwrap();

        store.delete("foo").unwrap();

        let events = store.all_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Hint);
        assert!(matches!(store.events("foo"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = SqliteStore::open_memory().unwrap();
        store.set("a", "1").unwrap();
        let b = store.set("b", "2").unwrap();
        store.delete("b").unwrap();

        let c = store.set("c", "3").unwrap();
        assert!(c > b);
    }

    #[test]
    fn test_missing_key_errors() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(matches!(store.delete("x"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.is_checked("x"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.set_checked("x"), Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.commit_failure_event("x"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boost.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("foo", "1").unwrap();
            store.commit_hint_event("foo").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.get("foo").unwrap().as_deref(), Some("1"));
        assert_eq!(store.events("foo").unwrap().len(), 1);
    }

    #[test]
    fn test_open_in_missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("dir").join("boost.db");

        let err = SqliteStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[test]
    fn test_open_read_only_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("k", "v").unwrap();
        }

        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&path, perms).unwrap();

        // Privileged users can write regardless of the mode bits
        if std::fs::OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        let err = SqliteStore::open(&path).err().unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::StorageUnavailable);
        assert!(matches!(err, StoreError::Unavailable { path: p, .. } if p == path));
    }

    #[test]
    fn test_long_keys_accepted() {
        let store = seeded();
        let long = "k".repeat(300);
        let longer = "é".repeat(1000);

        store.set(&long, "v").unwrap();
        assert_eq!(store.get(&long).unwrap().as_deref(), Some("v"));

        store.rename(&long, &longer, "w").unwrap();
        assert_eq!(store.get(&longer).unwrap().as_deref(), Some("w"));
        assert!(store.get(&long).unwrap().is_none());
    }

    #[test]
    fn test_persist_to_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("copy.db");
        std::fs::write(&dest, b"stale contents").unwrap();

        let store = seeded();
        store.persist_to(&dest).unwrap();

        let copy = SqliteStore::open(&dest).unwrap();
        assert_eq!(copy.keys().unwrap(), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_import_preserves_ids_and_continues_sequence() {
        let source = seeded();
        source.commit_success_event("bar").unwrap();
        let dataset = source.export().unwrap();

        let target = SqliteStore::open_memory().unwrap();
        target.set("leftover", "x").unwrap();
        target.import(&dataset).unwrap();

        assert_eq!(target.export().unwrap(), dataset);
        let next = target.set("qux", "4").unwrap();
        assert_eq!(next, RecordId::new(4));
    }
}
