//! Error types for the Boost core.

use thiserror::Error;

use crate::types::{EventId, RecordId};

/// Validation errors for keys, key arguments and datasets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("key must not be empty")]
    EmptyKey,

    #[error("key argument must be a key or an (old, new) pair, got {0} parts")]
    UnsupportedKeyShape(usize),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("duplicate record id {0}")]
    DuplicateRecordId(RecordId),

    #[error("duplicate record key {0:?}")]
    DuplicateRecordKey(String),

    #[error("duplicate event id {0}")]
    DuplicateEventId(EventId),

    #[error("event {event} references missing record {record}")]
    DanglingEvent { event: EventId, record: RecordId },

    #[error("record {id}: {source}")]
    InvalidRecord {
        id: RecordId,
        #[source]
        source: Box<ValidationError>,
    },
}
