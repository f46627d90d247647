//! Canonical timestamp representation.
//!
//! Timestamps are held as `DateTime<Utc>` truncated to whole microseconds, so
//! a value survives storage (integer microseconds) and interchange (canonical
//! string) without drift.
//!
//! The canonical string form is `YYYY-MM-DD HH:MM:SS.ffffff`, always with six
//! fractional digits, e.g. `2022-04-16 12:54:24.671922`.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::error::ValidationError;

/// A UTC timestamp with microsecond precision.
pub type Timestamp = DateTime<Utc>;

const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Naive layouts accepted on input. `%.f` also matches a missing fraction.
const ACCEPTED_NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Current time, truncated to microseconds.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

/// Render a timestamp in canonical string form.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(CANONICAL_FORMAT).to_string()
}

/// Parse a timestamp from canonical form, a naive ISO form, or RFC 3339.
///
/// Naive inputs are interpreted as UTC. Precision beyond microseconds is
/// truncated.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, ValidationError> {
    let s = s.trim();
    for format in ACCEPTED_NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc().trunc_subsecs(6));
        }
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(6))
        .map_err(|_| ValidationError::InvalidTimestamp(s.to_string()))
}

/// Microseconds since the Unix epoch, the storage form.
pub fn to_micros(ts: &Timestamp) -> i64 {
    ts.timestamp_micros()
}

/// Inverse of [`to_micros`].
pub fn from_micros(micros: i64) -> Result<Timestamp, ValidationError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| ValidationError::InvalidTimestamp(micros.to_string()))
}

/// Serde adapter writing timestamps in canonical string form.
///
/// Use with `#[serde(with = "boost_core::canonical::timestamp")]`.
pub mod timestamp {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{format_timestamp, parse_timestamp, Timestamp};

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
