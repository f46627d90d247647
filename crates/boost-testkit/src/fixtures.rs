//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::PathBuf;

use boost::{Repository, RepositoryConfig};
use boost_store::{SqliteStore, Store};
use tempfile::TempDir;

/// A scratch directory that owns every file a test creates.
///
/// Backups of repositories built through the fixture land in the same
/// directory, so nothing leaks into the system temp dir.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Create a fixture over a fresh temp dir.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Path of `name` inside the fixture directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Repository configuration keeping backups inside the fixture.
    pub fn config(&self) -> RepositoryConfig {
        RepositoryConfig {
            backup_dir: Some(self.dir.path().to_path_buf()),
            ..RepositoryConfig::default()
        }
    }

    /// Open (or create) the repository file `name`.
    pub fn repository(&self, name: &str) -> Repository {
        Repository::open_with_config(self.path(name), self.config())
            .expect("failed to open repository")
    }

    /// A Clean repository at `boost.db` holding `entries` in order.
    pub fn seeded_repository(&self, entries: &[(&str, &str)]) -> Repository {
        let mut repo = self.repository("boost.db");
        for (key, value) in entries {
            repo.set(*key, value).expect("failed to seed repository");
        }
        repo.save(None).expect("failed to save seeded repository");
        repo
    }

    /// Open (or create) the SQLite store file `name`.
    pub fn sqlite_store(&self, name: &str) -> SqliteStore {
        SqliteStore::open(self.path(name)).expect("failed to open sqlite store")
    }

    /// Number of files in the fixture directory.
    pub fn file_count(&self) -> usize {
        std::fs::read_dir(self.dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill `store` with `entries` in order.
pub fn seeded_store<S: Store + ?Sized>(store: &S, entries: &[(&str, &str)]) {
    for (key, value) in entries {
        store.set(key, value).expect("failed to seed store");
    }
}
