//! The Repository: undoable access to one vocabulary store.
//!
//! A repository is either Clean (no backup) or Dirty (a backup snapshot of the
//! store taken just before the first mutation since it was last Clean).
//! `restore` rolls the store back to that snapshot; `save` and `load` make the
//! current state the new baseline.

use std::fs;
use std::path::{Path, PathBuf};

use boost_core::{Event, EventId, Item};
use boost_store::{SqliteStore, Store, StoreError, StoreExt};
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::adapter::{read_dataset, Adapter};
use crate::error::{Error, Result};
use crate::key::KeyArg;

/// Configuration for a Repository.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Directory for backup snapshots. `None` uses the system temp dir.
    pub backup_dir: Option<PathBuf>,
    /// File-name prefix of backup snapshots.
    pub backup_prefix: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            backup_dir: None,
            backup_prefix: "boost-backup-".to_string(),
        }
    }
}

/// Undoable, path-addressable vocabulary store.
pub struct Repository {
    /// The live store.
    store: SqliteStore,
    /// Snapshot of the store before the first unsaved mutation.
    backup: Option<TempPath>,
    /// Configuration.
    config: RepositoryConfig,
}

impl Repository {
    /// Open the store at `path` with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, RepositoryConfig::default())
    }

    /// Open the store at `path`.
    pub fn open_with_config(path: impl AsRef<Path>, config: RepositoryConfig) -> Result<Self> {
        let store = SqliteStore::open(path)?;
        Ok(Self::with_store(store, config))
    }

    /// Open a repository over a fresh in-memory store.
    ///
    /// Nothing is written to disk until [`save`](Self::save) is given a path.
    pub fn open_memory() -> Result<Self> {
        let store = SqliteStore::open_memory()?;
        Ok(Self::with_store(store, RepositoryConfig::default()))
    }

    fn with_store(store: SqliteStore, config: RepositoryConfig) -> Self {
        Self {
            store,
            backup: None,
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// File backing the live store, `None` while it is in memory.
    pub fn path(&self) -> Option<&Path> {
        self.store.path()
    }

    /// Whether a backup exists, i.e. there are unsaved mutations.
    pub fn is_dirty(&self) -> bool {
        self.backup.is_some()
    }

    /// The current backup snapshot file, if Dirty.
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key)?)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains(key)?)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.store.count()?)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.keys()?)
    }

    /// Entries in insertion order.
    pub fn items(&self) -> Result<Vec<Item>> {
        Ok(self.store.items()?)
    }

    /// Audit events of `key`, oldest first.
    pub fn events(&self, key: &str) -> Result<Vec<Event>> {
        Ok(self.store.events(key)?)
    }

    pub fn is_checked(&self, key: &str) -> Result<bool> {
        Ok(self.store.is_checked(key)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Flags and Events
    //
    // These are not undoable and never change Clean/Dirty.
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_checked(&self, key: &str) -> Result<()> {
        Ok(self.store.set_checked(key)?)
    }

    pub fn set_unchecked(&self, key: &str) -> Result<()> {
        Ok(self.store.set_unchecked(key)?)
    }

    pub fn commit_success_event(&self, key: &str) -> Result<EventId> {
        Ok(self.store.commit_success_event(key)?)
    }

    pub fn commit_failure_event(&self, key: &str) -> Result<EventId> {
        Ok(self.store.commit_failure_event(key)?)
    }

    pub fn commit_hint_event(&self, key: &str) -> Result<EventId> {
        Ok(self.store.commit_hint_event(key)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or update a key, or rename one given an `(old, new)` pair.
    ///
    /// ```rust,no_run
    /// # fn main() -> boost::Result<()> {
    /// let mut repo = boost::Repository::open_memory()?;
    /// repo.set("der Hund", "the dog")?;
    /// repo.set(("der Hund", "der Hund (m)"), "the dog")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set(&mut self, key: impl Into<KeyArg>, value: &str) -> Result<()> {
        let key = key.into();
        key.validate()?;
        match key {
            KeyArg::Key(key) => {
                self.ensure_backup()?;
                let id = self.store.set(&key, value)?;
                debug!(key = %key, %id, "set entry");
                Ok(())
            }
            KeyArg::Rename { from, to } => self.rename(&from, &to, value),
        }
    }

    /// Rename `old_key` to `new_key` in place and replace its value.
    pub fn rename(&mut self, old_key: &str, new_key: &str, value: &str) -> Result<()> {
        boost_core::validate_key(new_key)?;
        if !self.store.contains(old_key)? {
            return Err(StoreError::NotFound(old_key.to_string()).into());
        }
        if new_key != old_key && self.store.contains(new_key)? {
            return Err(StoreError::DuplicateKey(new_key.to_string()).into());
        }

        self.ensure_backup()?;
        self.store.rename(old_key, new_key, value)?;
        debug!(from = %old_key, to = %new_key, "renamed entry");
        Ok(())
    }

    /// Remove `key` together with its events.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        if !self.store.contains(key)? {
            return Err(StoreError::NotFound(key.to_string()).into());
        }

        self.ensure_backup()?;
        self.store.delete(key)?;
        debug!(key = %key, "deleted entry");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Take a backup snapshot now. No-op while Dirty.
    pub fn backup(&mut self) -> Result<()> {
        self.ensure_backup()
    }

    /// Roll the store back to the backup snapshot. No-op while Clean.
    ///
    /// Entries come back in their original order with their checked flags,
    /// and each entry's event history is re-appended oldest first.
    pub fn restore(&mut self) -> Result<()> {
        let Some(backup) = self.backup.as_deref() else {
            debug!("nothing to restore");
            return Ok(());
        };

        let snapshot = SqliteStore::open(backup)?.export()?;
        self.store.clear()?;
        self.store.replay(&snapshot)?;

        info!(
            records = snapshot.records.len(),
            events = snapshot.events.len(),
            "restored backup"
        );
        self.discard_backup();
        Ok(())
    }

    /// Make the current state the baseline.
    ///
    /// With a path, the live store is first copied to `path` (replacing any
    /// file there) and reopened from it. The backup is discarded either way.
    pub fn save(&mut self, path: Option<&Path>) -> Result<()> {
        if let Some(dest) = path {
            if !self.is_open_at(dest) {
                self.store.persist_to(dest)?;
                self.store = SqliteStore::open(dest)?;
            }
            info!(path = %dest.display(), "saved repository");
        }

        self.discard_backup();
        Ok(())
    }

    /// Shorthand for `save(Some(path))`.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.save(Some(path.as_ref()))
    }

    /// Switch the live store to the file at `path`, dropping any backup.
    ///
    /// On failure the current store and backup are kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let store = SqliteStore::open(path)?;

        self.discard_backup();
        self.store = store;
        info!(path = %path.display(), "loaded repository");
        Ok(())
    }

    /// Dump the live store to the JSON document at `path`.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        Adapter::new(&self.store).dump(path)
    }

    /// Replace the live store's content with the JSON document at `path`.
    ///
    /// Undoable like any other mutation. The document is read and checked
    /// before the backup is taken, so a missing or malformed file leaves the
    /// repository as it was.
    pub fn import(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dataset = read_dataset(path)?;

        self.ensure_backup()?;
        self.store.import(&dataset).map_err(|e| match e {
            StoreError::MalformedInput(reason) => Error::malformed(path, reason),
            other => Error::Store(other),
        })?;

        info!(
            path = %path.display(),
            records = dataset.records.len(),
            events = dataset.events.len(),
            "imported dataset"
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot the live store into a fresh temp file unless already Dirty.
    fn ensure_backup(&mut self) -> Result<()> {
        if self.backup.is_some() {
            return Ok(());
        }

        let dir = self
            .config
            .backup_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let backup = tempfile::Builder::new()
            .prefix(&self.config.backup_prefix)
            .suffix(".db")
            .tempfile_in(&dir)
            .map_err(|e| Error::io(&dir, e))?
            .into_temp_path();

        self.store.snapshot_into(&backup)?;
        info!(backup = %backup.display(), "created backup snapshot");
        self.backup = Some(backup);
        Ok(())
    }

    fn discard_backup(&mut self) {
        if let Some(backup) = self.backup.take() {
            let path = backup.to_path_buf();
            match backup.close() {
                Ok(()) => debug!(backup = %path.display(), "discarded backup"),
                Err(e) => warn!(backup = %path.display(), error = %e, "failed to remove backup"),
            }
        }
    }

    fn is_open_at(&self, dest: &Path) -> bool {
        let Some(current) = self.store.path() else {
            return false;
        };
        match (fs::canonicalize(current), fs::canonicalize(dest)) {
            (Ok(current), Ok(dest)) => current == dest,
            _ => false,
        }
    }
}
