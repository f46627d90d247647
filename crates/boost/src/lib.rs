//! # Boost
//!
//! Persistence core of the Boost vocabulary trainer: an undoable repository
//! of key → value entries with a checked flag and an audit log per entry, and
//! a JSON interchange format for moving whole stores around.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boost::Repository;
//!
//! # fn main() -> boost::Result<()> {
//! let mut repo = Repository::open("vocabulary.db")?;
//!
//! repo.set("der Hund", "the dog")?;
//! repo.set("die Katze", "the cat")?;
//! repo.commit_success_event("der Hund")?;
//! assert!(repo.is_dirty());
//!
//! // Undo everything since the last save
//! repo.restore()?;
//!
//! // Or keep it
//! repo.set("die Maus", "the mouse")?;
//! repo.save(None)?;
//!
//! repo.export("vocabulary.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`repository`] - Undo-by-snapshot and the save/load lifecycle
//! - [`adapter`] - JSON dump/load of a whole store
//! - [`key`] - Key arguments for `Repository::set`
//! - [`error`] - Error types
//!
//! The storage layer and data model are re-exported as [`store`] and
//! [`core`].

pub mod adapter;
pub mod error;
pub mod key;
pub mod repository;

pub use adapter::Adapter;
pub use error::{Error, Result};
pub use key::KeyArg;
pub use repository::{Repository, RepositoryConfig};

// Re-export sub-crates for convenience
pub use boost_core as core;
pub use boost_store as store;

pub use boost_core::{Event, EventId, EventType, Item, Record, RecordId};
pub use boost_store::{ErrorKind, MemoryStore, SqliteStore, Store, StoreExt};
