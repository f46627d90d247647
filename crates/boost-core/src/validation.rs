//! Validation rules for keys and datasets.
//!
//! Stores call these before touching storage, so a rejected input never
//! leaves partial state behind.

use std::collections::HashSet;

use crate::dataset::Dataset;
use crate::error::ValidationError;

/// Validate a record key. Any non-empty string is a key; there is no length
/// limit.
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    Ok(())
}

/// Validate a dataset before import.
///
/// Checks:
/// 1. Every record key is valid
/// 2. Record ids and keys are unique
/// 3. Event ids are unique
/// 4. Every event references a record in the dataset
pub fn validate_dataset(dataset: &Dataset) -> Result<(), ValidationError> {
    let mut record_ids = HashSet::with_capacity(dataset.records.len());
    let mut keys = HashSet::with_capacity(dataset.records.len());

    for record in &dataset.records {
        validate_key(&record.key).map_err(|e| ValidationError::InvalidRecord {
            id: record.id,
            source: Box::new(e),
        })?;

        if !record_ids.insert(record.id) {
            return Err(ValidationError::DuplicateRecordId(record.id));
        }
        if !keys.insert(record.key.as_str()) {
            return Err(ValidationError::DuplicateRecordKey(record.key.clone()));
        }
    }

    let mut event_ids = HashSet::with_capacity(dataset.events.len());
    for event in &dataset.events {
        if !event_ids.insert(event.id) {
            return Err(ValidationError::DuplicateEventId(event.id));
        }
        if !record_ids.contains(&event.record_id) {
            return Err(ValidationError::DanglingEvent {
                event: event.id,
                record: event.record_id,
            });
        }
    }

    Ok(())
}
