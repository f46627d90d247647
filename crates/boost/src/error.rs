//! Error types for the repository and interchange layer.

use std::path::PathBuf;

use boost_core::ValidationError;
use boost_store::{ErrorKind, StoreError};
use thiserror::Error;

/// Errors that can occur during repository and adapter operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Interchange file does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Interchange file exists but is not a valid dataset document.
    #[error("malformed input in {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    /// Filesystem error outside the database (backup or interchange files).
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Store(err) => err.kind(),
            Error::FileNotFound(_) => ErrorKind::NotFound,
            Error::MalformedInput { .. } => ErrorKind::MalformedInput,
            Error::Io { .. } => ErrorKind::StorageUnavailable,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Store(StoreError::InvalidArgument(err))
    }
}

/// Result type for repository and adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_passes_through_store_errors() {
        let err = Error::from(StoreError::DuplicateKey("foo".into()));
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);

        let err = Error::from(ValidationError::UnsupportedKeyShape(3));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_file_errors() {
        assert_eq!(
            Error::FileNotFound("missing.json".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::malformed("bad.json", "EOF while parsing").kind(),
            ErrorKind::MalformedInput
        );
        let msg = Error::malformed("bad.json", "EOF while parsing").to_string();
        assert_eq!(msg, "malformed input in bad.json: EOF while parsing");
    }
}
