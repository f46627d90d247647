//! # Boost Store
//!
//! Storage abstraction for the Boost vocabulary store. Provides a trait-based
//! interface for ordered key → value persistence with a per-key checked flag
//! and audit log, with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`Store`] trait. The
//! primary implementation is [`SqliteStore`], one database file per store,
//! with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The trait for all storage operations
//! - [`StoreExt`] - Checked-flag and event shorthands, dataset replay
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`StoreError`] / [`ErrorKind`] - Failures and their classification
//!
//! ## Usage
//!
//! ```rust,no_run
//! use boost_store::{SqliteStore, Store, StoreExt};
//!
//! let store = SqliteStore::open("boost.db").unwrap();
//!
//! store.set("der Hund", "the dog").unwrap();
//! store.commit_success_event("der Hund").unwrap();
//!
//! // Rename in place: the entry keeps its position
//! store.rename("der Hund", "der Hund (m)", "the dog").unwrap();
//!
//! for item in store.items().unwrap() {
//!     println!("{} = {} ({})", item.key, item.value, item.is_checked);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Insertion order**: listings follow ascending record id
//! - **Rename in place**: identity survives a key change
//! - **Cascade**: deleting a record deletes its events
//! - **Auto-commit**: every mutating call is durable on return

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{ErrorKind, Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
