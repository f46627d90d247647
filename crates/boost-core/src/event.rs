//! Audit events: immutable quiz outcomes attached to a record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canonical::{self, Timestamp};
use crate::error::ValidationError;
use crate::types::{EventId, RecordId};

/// Outcome of one quiz round for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Success,
    Failure,
    Hint,
}

impl EventType {
    pub const ALL: [EventType; 3] = [EventType::Success, EventType::Failure, EventType::Hint];

    /// Storage and wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventType::Success => "SUCCESS",
            EventType::Failure => "FAILURE",
            EventType::Hint => "HINT",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(EventType::Success),
            "FAILURE" => Ok(EventType::Failure),
            "HINT" => Ok(EventType::Hint),
            other => Err(ValidationError::UnknownEventType(other.to_string())),
        }
    }
}

/// One audit entry. Events are append-only and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Event {
    pub id: EventId,

    #[serde(rename = "created_on", with = "canonical::timestamp")]
    pub created_at: Timestamp,

    #[serde(rename = "updated_on", with = "canonical::timestamp")]
    pub updated_at: Timestamp,

    pub event_type: EventType,

    /// The owning record.
    pub record_id: RecordId,
}
