//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use boost_core::{now, validate_key, Dataset, Event, EventId, EventType, Record, RecordId};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records in id order.
    records: BTreeMap<RecordId, Record>,

    /// Key index: key -> record id.
    by_key: HashMap<String, RecordId>,

    /// Events in id order.
    events: BTreeMap<EventId, Event>,

    /// Last id handed out; never decreases.
    last_record_id: i64,
    last_event_id: i64,
}

impl MemoryStoreInner {
    fn id_of(&self, key: &str) -> Result<RecordId> {
        self.by_key
            .get(key)
            .copied()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn record_mut(&mut self, key: &str) -> Result<&mut Record> {
        let id = self.id_of(key)?;
        self.records
            .get_mut(&id)
            .ok_or_else(|| StoreError::InvalidData(format!("key index points at missing record {id}")))
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get_record(&self, key: &str) -> Result<Option<Record>> {
        let inner = self.read()?;
        Ok(inner
            .by_key
            .get(key)
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }

    fn set(&self, key: &str, value: &str) -> Result<RecordId> {
        validate_key(key)?;
        let now = now();
        let mut inner = self.write()?;

        if let Some(&id) = inner.by_key.get(key) {
            let record = inner.record_mut(key)?;
            record.value = value.to_string();
            record.updated_at = now;
            return Ok(id);
        }

        inner.last_record_id += 1;
        let id = RecordId::new(inner.last_record_id);
        inner.records.insert(
            id,
            Record {
                id,
                key: key.to_string(),
                value: value.to_string(),
                is_checked: true,
                created_at: now,
                updated_at: now,
            },
        );
        inner.by_key.insert(key.to_string(), id);
        Ok(id)
    }

    fn rename(&self, old_key: &str, new_key: &str, value: &str) -> Result<()> {
        validate_key(new_key)?;
        let now = now();
        let mut inner = self.write()?;

        let id = inner.id_of(old_key)?;
        if new_key != old_key && inner.by_key.contains_key(new_key) {
            return Err(StoreError::DuplicateKey(new_key.to_string()));
        }

        let record = inner.record_mut(old_key)?;
        record.key = new_key.to_string();
        record.value = value.to_string();
        record.updated_at = now;

        inner.by_key.remove(old_key);
        inner.by_key.insert(new_key.to_string(), id);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut inner = self.write()?;

        let id = inner.id_of(key)?;
        inner.records.remove(&id);
        inner.by_key.remove(key);
        inner.events.retain(|_, event| event.record_id != id);
        Ok(())
    }

    fn set_checked_flag(&self, key: &str, checked: bool) -> Result<()> {
        let now = now();
        let mut inner = self.write()?;

        let record = inner.record_mut(key)?;
        record.is_checked = checked;
        record.updated_at = now;
        Ok(())
    }

    fn commit_event(&self, key: &str, event_type: EventType) -> Result<EventId> {
        let now = now();
        let mut inner = self.write()?;

        let record_id = inner.id_of(key)?;
        inner.last_event_id += 1;
        let id = EventId::new(inner.last_event_id);
        inner.events.insert(
            id,
            Event {
                id,
                event_type,
                record_id,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn events(&self, key: &str) -> Result<Vec<Event>> {
        let inner = self.read()?;
        let record_id = inner.id_of(key)?;
        Ok(inner
            .events
            .values()
            .filter(|event| event.record_id == record_id)
            .cloned()
            .collect())
    }

    fn all_events(&self) -> Result<Vec<Event>> {
        Ok(self.read()?.events.values().cloned().collect())
    }

    fn records(&self) -> Result<Vec<Record>> {
        Ok(self.read()?.records.values().cloned().collect())
    }

    fn import(&self, dataset: &Dataset) -> Result<()> {
        dataset.validate().map_err(StoreError::MalformedInput)?;

        let mut inner = self.write()?;
        *inner = MemoryStoreInner {
            records: dataset.records.iter().map(|r| (r.id, r.clone())).collect(),
            by_key: dataset.records.iter().map(|r| (r.key.clone(), r.id)).collect(),
            events: dataset.events.iter().map(|e| (e.id, e.clone())).collect(),
            last_record_id: dataset.records.iter().map(|r| r.id.get()).max().unwrap_or(0),
            last_event_id: dataset.events.iter().map(|e| e.id.get()).max().unwrap_or(0),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStore::new();
        store.set("foo", "1").unwrap();
        store.set("bar", "2").unwrap();

        assert_eq!(store.get("foo").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["foo", "bar"]);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_memory_store_rename_keeps_position() {
        let store = MemoryStore::new();
        for key in ["foo", "bar", "baz"] {
            store.set(key, key).unwrap();
        }

        store.rename("foo", "foo_new", "spam").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["foo_new", "bar", "baz"]);
        assert!(!store.contains("foo").unwrap());

        store.rename("bar", "bar", "eggs").unwrap();
        assert_eq!(store.get("bar").unwrap().as_deref(), Some("eggs"));
    }

    #[test]
    fn test_memory_store_long_keys() {
        let store = MemoryStore::new();
        let long = "k".repeat(300);

        store.set(&long, "v").unwrap();
        store.rename(&long, &"n".repeat(500), "w").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["n".repeat(500)]);
    }

    #[test]
    fn test_memory_store_cascade_and_monotonic_ids() {
        let store = MemoryStore::new();
        store.set("foo", "1").unwrap();
        let e1 = store.commit_success_event("foo").unwrap();
        store.delete("foo").unwrap();

        assert!(store.all_events().unwrap().is_empty());

        let id = store.set("foo", "again").unwrap();
        assert_eq!(id, RecordId::new(2));
        assert!(store.is_checked("foo").unwrap());
        let e2 = store.commit_hint_event("foo").unwrap();
        assert!(e2 > e1);
    }

    #[test]
    fn test_memory_store_import_rejects_invalid_dataset() {
        let store = MemoryStore::new();
        store.set("keep", "me").unwrap();

        let source = MemoryStore::new();
        source.set("a", "1").unwrap();
        let mut dataset = source.export().unwrap();
        dataset.records.push(dataset.records[0].clone());

        assert!(matches!(
            store.import(&dataset),
            Err(StoreError::MalformedInput(_))
        ));
        assert_eq!(store.keys().unwrap(), vec!["keep"]);
    }
}
