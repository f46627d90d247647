//! JSON interchange for a whole store.
//!
//! The document is a single object with a `records` table and an `events`
//! table, written in dependency order so a loader can insert records before
//! the events that point at them. Empty tables are left out.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use boost_core::Dataset;
use boost_store::{Store, StoreError};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Label used in errors for documents that did not come from a file.
const INLINE_SOURCE: &str = "<inline>";

/// Moves the full dataset of a store to and from a JSON document.
pub struct Adapter<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Adapter<'a, S> {
    /// Create an adapter over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The store this adapter reads from and writes to.
    pub fn store(&self) -> &'a S {
        self.store
    }

    /// Write the store's content to `path`.
    ///
    /// The document is staged in a sibling temp file and renamed over `path`,
    /// so a crash never leaves a truncated file behind.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dataset = self.store.export()?;
        write_dataset(path, &dataset)?;

        info!(
            path = %path.display(),
            records = dataset.records.len(),
            events = dataset.events.len(),
            "dumped store"
        );
        Ok(())
    }

    /// Replace the store's content with the document at `path`.
    ///
    /// Fails with [`Error::FileNotFound`] when `path` does not exist and with
    /// [`Error::MalformedInput`] when it is not a valid dataset document. The
    /// store is untouched on either failure.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dataset = read_dataset(path)?;
        self.import_from(path, &dataset)?;

        info!(
            path = %path.display(),
            records = dataset.records.len(),
            events = dataset.events.len(),
            "loaded store"
        );
        Ok(())
    }

    /// Like [`load`](Self::load), but a missing file is not an error.
    ///
    /// Returns whether anything was loaded.
    pub fn load_if_exists(&self, path: impl AsRef<Path>) -> Result<bool> {
        match self.load(path.as_ref()) {
            Ok(()) => Ok(true),
            Err(Error::FileNotFound(path)) => {
                debug!(path = %path.display(), "no interchange file, nothing to load");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Reset the store to an empty schema.
    pub fn drop_tables(&self) -> Result<()> {
        self.store.import(&Dataset::default())?;
        info!("dropped store tables");
        Ok(())
    }

    /// Render the store's content as a JSON document.
    pub fn to_json(&self) -> Result<String> {
        let bytes = to_pretty_json(&self.store.export()?)
            .map_err(|e| Error::Store(StoreError::InvalidData(e.to_string())))?;
        String::from_utf8(bytes).map_err(|e| Error::Store(StoreError::InvalidData(e.to_string())))
    }

    /// Replace the store's content with the given JSON document.
    pub fn from_json(&self, json: &str) -> Result<()> {
        let dataset = parse_dataset(INLINE_SOURCE, json.as_bytes())?;
        self.import_from(Path::new(INLINE_SOURCE), &dataset)
    }

    fn import_from(&self, source: &Path, dataset: &Dataset) -> Result<()> {
        self.store.import(dataset).map_err(|e| match e {
            StoreError::MalformedInput(reason) => Error::malformed(source, reason),
            other => Error::Store(other),
        })
    }
}

/// Read and validate the dataset document at `path`.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::io(path, e),
    })?;
    parse_dataset(path, &bytes)
}

/// Write `dataset` to `path` as an indented JSON document, atomically.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_pretty_json(dataset)
        .map_err(|e| Error::Store(StoreError::InvalidData(e.to_string())))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = tempfile::Builder::new()
        .prefix(".boost-")
        .suffix(".json")
        .tempfile_in(dir)
        .map_err(|e| Error::io(path, e))?;

    staging.write_all(&bytes).map_err(|e| Error::io(path, e))?;
    staging.write_all(b"\n").map_err(|e| Error::io(path, e))?;
    staging.as_file().sync_all().map_err(|e| Error::io(path, e))?;
    staging.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

fn parse_dataset(source: impl Into<PathBuf>, bytes: &[u8]) -> Result<Dataset> {
    let source = source.into();
    let dataset: Dataset =
        serde_json::from_slice(bytes).map_err(|e| Error::malformed(&source, e))?;
    dataset
        .validate()
        .map_err(|e| Error::malformed(&source, e))?;
    Ok(dataset)
}

fn to_pretty_json(dataset: &Dataset) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    dataset.serialize(&mut ser)?;
    Ok(buf)
}
