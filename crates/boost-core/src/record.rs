//! Records: the expression/meaning entries of a vocabulary.

use serde::{Deserialize, Serialize};

use crate::canonical::{self, Timestamp};
use crate::types::RecordId;

fn default_checked() -> bool {
    true
}

/// One vocabulary entry.
///
/// The serialized field names follow the interchange format: the key is
/// written as `expression` and the value as `meaning`; `key` and `value` are
/// accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    pub id: RecordId,

    #[serde(rename = "created_on", with = "canonical::timestamp")]
    pub created_at: Timestamp,

    #[serde(rename = "updated_on", with = "canonical::timestamp")]
    pub updated_at: Timestamp,

    #[serde(rename = "expression", alias = "key")]
    pub key: String,

    #[serde(rename = "meaning", alias = "value")]
    pub value: String,

    /// Whether the record takes part in the active quiz set.
    #[serde(default = "default_checked")]
    pub is_checked: bool,
}

impl Record {
    /// The listing view of this record.
    pub fn item(&self) -> Item {
        Item {
            key: self.key.clone(),
            value: self.value.clone(),
            is_checked: self.is_checked,
        }
    }
}

/// A record as seen by listings: key, value and checked flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub key: String,
    pub value: String,
    pub is_checked: bool,
}

impl Item {
    pub fn new(key: impl Into<String>, value: impl Into<String>, is_checked: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            is_checked,
        }
    }

    /// Split into the `(key, (value, is_checked))` pair shape.
    pub fn into_pair(self) -> (String, (String, bool)) {
        (self.key, (self.value, self.is_checked))
    }
}

impl From<Record> for Item {
    fn from(record: Record) -> Self {
        Self {
            key: record.key,
            value: record.value,
            is_checked: record.is_checked,
        }
    }
}
