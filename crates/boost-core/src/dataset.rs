//! The full content of a store, as exchanged in bulk.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::event::Event;
use crate::record::{Item, Record};
use crate::types::RecordId;
use crate::validation::validate_dataset;

/// Records and events of one store.
///
/// Tables are listed in dependency order: events reference records, so
/// records come first. Empty tables are omitted when serialized and default
/// to empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Record>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

impl Dataset {
    pub fn new(records: Vec<Record>, events: Vec<Event>) -> Self {
        Self { records, events }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.events.is_empty()
    }

    /// Check key and referential invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_dataset(self)
    }

    /// Records as listing items, in ascending id order.
    pub fn items(&self) -> Vec<Item> {
        let mut records: Vec<&Record> = self.records.iter().collect();
        records.sort_by_key(|r| r.id);
        records.into_iter().map(Record::item).collect()
    }

    /// Events owned by `record`, in ascending id order.
    pub fn events_for(&self, record: RecordId) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| e.record_id == record)
            .collect();
        events.sort_by_key(|e| e.id);
        events
    }

    /// Highest record id present, if any.
    pub fn max_record_id(&self) -> Option<RecordId> {
        self.records.iter().map(|r| r.id).max()
    }
}
