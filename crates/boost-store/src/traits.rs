//! Store trait: the abstract interface for vocabulary persistence.
//!
//! This trait keeps the repository storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use boost_core::{Dataset, Event, EventId, EventType, Item, Record, RecordId};

use crate::error::{Result, StoreError};

/// The Store trait: ordered key → value storage with a checked flag and an
/// append-only audit log per key.
///
/// # Design Notes
///
/// - **Ordering**: listings are in ascending [`RecordId`] order, which is
///   insertion order. [`Store::rename`] keeps the id, so a renamed entry keeps
///   its position.
/// - **Durability**: every mutating call is its own committed transaction.
/// - **Cascade**: deleting a record deletes its events in the same
///   transaction.
/// - **Identity**: ids are never reused within a store's lifetime.
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the full record for a key.
    fn get_record(&self, key: &str) -> Result<Option<Record>>;

    /// Get the value stored under a key.
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_record(key)?.map(|record| record.value))
    }

    /// Check whether a key exists.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_record(key)?.is_some())
    }

    /// Number of live records.
    fn count(&self) -> Result<usize>;

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or update a record.
    ///
    /// A new key is appended with `is_checked = true`. An existing key keeps
    /// its id, position and checked flag; only the value and `updated_at`
    /// change.
    fn set(&self, key: &str, value: &str) -> Result<RecordId>;

    /// Change a record's key and value in place.
    ///
    /// # Errors
    /// - `NotFound` if `old_key` does not exist.
    /// - `DuplicateKey` if `new_key` differs from `old_key` and is taken.
    fn rename(&self, old_key: &str, new_key: &str, value: &str) -> Result<()>;

    /// Delete a record and all of its events.
    fn delete(&self, key: &str) -> Result<()>;

    /// Delete every record, one durable deletion at a time.
    fn clear(&self) -> Result<()> {
        for key in self.keys()? {
            self.delete(&key)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checked Flag
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the record takes part in the active quiz set.
    fn is_checked(&self, key: &str) -> Result<bool> {
        self.get_record(key)?
            .map(|record| record.is_checked)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    /// Set the checked flag of an existing record.
    fn set_checked_flag(&self, key: &str, checked: bool) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Audit Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Append an event to the record's history.
    fn commit_event(&self, key: &str, event_type: EventType) -> Result<EventId>;

    /// Events of one record, oldest first.
    fn events(&self, key: &str) -> Result<Vec<Event>>;

    /// Every event in the store, oldest first.
    fn all_events(&self) -> Result<Vec<Event>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Listing
    // ─────────────────────────────────────────────────────────────────────────

    /// All records in insertion order.
    fn records(&self) -> Result<Vec<Record>>;

    /// All keys in insertion order.
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records()?.into_iter().map(|record| record.key).collect())
    }

    /// All `(key, value, is_checked)` items in insertion order.
    fn items(&self) -> Result<Vec<Item>> {
        Ok(self.records()?.into_iter().map(Item::from).collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Full content of the store, records then events.
    fn export(&self) -> Result<Dataset> {
        Ok(Dataset::new(self.records()?, self.all_events()?))
    }

    /// Replace the whole content with `dataset`.
    ///
    /// Drops and rebuilds the schema, then inserts records and events keeping
    /// their ids and timestamps. The dataset is validated first; an invalid
    /// one fails with `MalformedInput` and leaves the store untouched.
    fn import(&self, dataset: &Dataset) -> Result<()>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Mark a record as checked.
    fn set_checked(&self, key: &str) -> Result<()> {
        self.set_checked_flag(key, true)
    }

    /// Mark a record as unchecked.
    fn set_unchecked(&self, key: &str) -> Result<()> {
        self.set_checked_flag(key, false)
    }

    fn commit_success_event(&self, key: &str) -> Result<EventId> {
        self.commit_event(key, EventType::Success)
    }

    fn commit_failure_event(&self, key: &str) -> Result<EventId> {
        self.commit_event(key, EventType::Failure)
    }

    fn commit_hint_event(&self, key: &str) -> Result<EventId> {
        self.commit_event(key, EventType::Hint)
    }

    /// Re-create `dataset`'s records and histories on top of this store.
    ///
    /// Unlike [`Store::import`], this goes through the ordinary operations:
    /// records are appended in id order with fresh ids, checked flags are
    /// applied, and each record's events are re-appended oldest first.
    fn replay(&self, dataset: &Dataset) -> Result<()> {
        let mut records: Vec<&Record> = dataset.records.iter().collect();
        records.sort_by_key(|record| record.id);

        for record in records {
            self.set(&record.key, &record.value)?;
            if !record.is_checked {
                self.set_unchecked(&record.key)?;
            }
            for event in dataset.events_for(record.id) {
                self.commit_event(&record.key, event.event_type)?;
            }
        }
        Ok(())
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
