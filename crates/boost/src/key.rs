//! Key arguments accepted by [`Repository::set`](crate::Repository::set).

use boost_core::{validate_key, ValidationError};

/// What a `set` call addresses: a single key, or an `(old, new)` rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyArg {
    /// Insert or update this key.
    Key(String),
    /// Rename `from` to `to` in place, keeping its position.
    Rename { from: String, to: String },
}

impl KeyArg {
    /// The key the record will have after the call.
    pub fn target(&self) -> &str {
        match self {
            KeyArg::Key(key) => key,
            KeyArg::Rename { to, .. } => to,
        }
    }

    /// Check that the target key is acceptable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_key(self.target())
    }
}

impl From<&str> for KeyArg {
    fn from(key: &str) -> Self {
        KeyArg::Key(key.to_string())
    }
}

impl From<String> for KeyArg {
    fn from(key: String) -> Self {
        KeyArg::Key(key)
    }
}

impl From<&String> for KeyArg {
    fn from(key: &String) -> Self {
        KeyArg::Key(key.clone())
    }
}

impl From<(&str, &str)> for KeyArg {
    fn from((from, to): (&str, &str)) -> Self {
        KeyArg::Rename {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<(String, String)> for KeyArg {
    fn from((from, to): (String, String)) -> Self {
        KeyArg::Rename { from, to }
    }
}

/// One part is a key, two parts are a rename; any other shape is rejected.
impl<'a, S: AsRef<str>> TryFrom<&'a [S]> for KeyArg {
    type Error = ValidationError;

    fn try_from(parts: &'a [S]) -> Result<Self, Self::Error> {
        match parts {
            [key] => Ok(KeyArg::from(key.as_ref())),
            [from, to] => Ok(KeyArg::from((from.as_ref(), to.as_ref()))),
            other => Err(ValidationError::UnsupportedKeyShape(other.len())),
        }
    }
}
