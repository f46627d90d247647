//! Error types for the store module.

use std::path::PathBuf;

use boost_core::ValidationError;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Coarse classification of failures, shared by every layer.
///
/// Callers that only need to decide how to react (tell the user a key is
/// missing, a file is unreadable, ...) match on this instead of the concrete
/// error enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A key, record or file that the operation referenced does not exist.
    NotFound,
    /// A second record with an existing key would have been introduced.
    DuplicateKey,
    /// The backing file cannot be opened or written.
    StorageUnavailable,
    /// Interchange input is present but not in the expected shape.
    MalformedInput,
    /// An argument of unsupported shape or content was passed.
    InvalidArgument,
    /// Anything else: database corruption, poisoned locks, failed migrations.
    Internal,
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The backing file could not be opened, created or written.
    #[error("storage unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Record not found.
    #[error("record not found: {0:?}")]
    NotFound(String),

    /// Key already used by another record.
    #[error("key already exists: {0:?}")]
    DuplicateKey(String),

    /// Rejected argument (empty key, unsupported key shape, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// Dataset violates store invariants.
    #[error("malformed input: {0}")]
    MalformedInput(ValidationError),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn unavailable(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Unavailable {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::DuplicateKey(_) => ErrorKind::DuplicateKey,
            StoreError::Unavailable { .. } | StoreError::Io(_) => ErrorKind::StorageUnavailable,
            StoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StoreError::MalformedInput(_) => ErrorKind::MalformedInput,
            StoreError::Database(err) => match err.sqlite_error_code() {
                Some(
                    ErrorCode::CannotOpen
                    | ErrorCode::ReadOnly
                    | ErrorCode::DiskFull
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::PermissionDenied,
                ) => ErrorKind::StorageUnavailable,
                Some(ErrorCode::ConstraintViolation) => ErrorKind::DuplicateKey,
                _ => ErrorKind::Internal,
            },
            StoreError::InvalidData(_) | StoreError::Migration(_) | StoreError::Poisoned => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(StoreError::NotFound("foo".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            StoreError::DuplicateKey("foo".into()).kind(),
            ErrorKind::DuplicateKey
        );
        assert_eq!(
            StoreError::from(ValidationError::EmptyKey).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            StoreError::MalformedInput(ValidationError::EmptyKey).kind(),
            ErrorKind::MalformedInput
        );
        assert_eq!(StoreError::Poisoned.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_cannot_open_is_storage_unavailable() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            None,
        );
        assert_eq!(StoreError::from(err).kind(), ErrorKind::StorageUnavailable);
    }
}
