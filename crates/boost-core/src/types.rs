//! Strong identifier types for records and events.
//!
//! Identities are opaque, monotonically increasing integers assigned by the
//! store. They are newtypes so a record id can never be passed where an event
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a [`Record`](crate::Record).
///
/// Ascending `RecordId` order is insertion order. A rename keeps the id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

/// Identity of an [`Event`](crate::Event).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Wrap a raw identity.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw identity value.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

impl_id!(RecordId);
impl_id!(EventId);
