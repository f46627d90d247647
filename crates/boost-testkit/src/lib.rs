//! # Boost Testkit
//!
//! Testing utilities for Boost.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: The reference interchange document with the listing
//!   and histories it must load into
//! - **Generators**: Proptest strategies for keys, values and operation
//!   sequences, plus a reference model to check stores against
//! - **Fixtures**: Temp-dir backed repositories and seeded stores
//!
//! ## Golden Vectors
//!
//! ```rust
//! use boost::{Adapter, MemoryStore, Store};
//! use boost_testkit::vectors::{golden_document, golden_items};
//!
//! let store = MemoryStore::new();
//! Adapter::new(&store).from_json(golden_document()).unwrap();
//! assert_eq!(store.items().unwrap(), golden_items());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use boost::MemoryStore;
//! use boost_testkit::generators::{apply_all, ops, Model};
//!
//! proptest! {
//!     #[test]
//!     fn store_matches_model(ops in ops(64)) {
//!         let store = MemoryStore::new();
//!         let model = apply_all(&store, &ops);
//!         prop_assert_eq!(store.keys().unwrap(), model.keys());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use boost_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let repo = fixture.seeded_repository(&[("foo", "1"), ("bar", "2")]);
//! assert!(!repo.is_dirty());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{seeded_store, TestFixture};
pub use generators::{apply_all, Model, Op};
pub use vectors::{golden_dataset, golden_document, golden_histories, golden_items};

/// Install a fmt subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}
