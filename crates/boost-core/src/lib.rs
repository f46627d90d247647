//! # Boost Core
//!
//! Pure data model for the Boost vocabulary store: records, audit events,
//! and the dataset shape used for bulk import/export.
//!
//! This crate contains no I/O and no storage. It defines the types every
//! other crate agrees on, plus the validation rules that keep them sound.
//!
//! ## Key Types
//!
//! - [`Record`] - One expression/meaning entry with its checked flag
//! - [`Event`] - An immutable quiz outcome attached to a record
//! - [`EventType`] - `SUCCESS`, `FAILURE` or `HINT`
//! - [`Item`] - The `(key, value, is_checked)` view returned by listings
//! - [`Dataset`] - Full store content, records before events
//!
//! ## Timestamps
//!
//! All timestamps are UTC with microsecond precision. See [`canonical`] for the
//! string form used on the wire.

pub mod canonical;
pub mod dataset;
pub mod error;
pub mod event;
pub mod record;
pub mod types;
pub mod validation;

pub use canonical::{format_timestamp, now, parse_timestamp, Timestamp};
pub use dataset::Dataset;
pub use error::ValidationError;
pub use event::{Event, EventType};
pub use record::{Item, Record};
pub use types::{EventId, RecordId};
pub use validation::{validate_dataset, validate_key};
