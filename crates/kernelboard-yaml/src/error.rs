//! Error types for plan loading.

use std::fmt;
use std::path::PathBuf;

/// Error type for plan loading.
#[derive(Debug)]
pub enum LoadError {
    /// Reading the plan file failed
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// YAML syntax or shape error
    Yaml(serde_yaml_ng::Error),
    /// Required structure is missing
    MalformedConfig {
        /// Missing key
        key: String,
        /// Where the key was expected
        context: String,
    },
    /// A field holds a value of the wrong type
    InvalidValue {
        /// Field path
        field: String,
        /// Error message
        message: String,
    },
}

impl LoadError {
    pub(crate) fn missing(key: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MalformedConfig {
            key: key.into(),
            context: context.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the plan itself is at fault, as opposed to reading it.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Failed to read {}: {source}", path.display()),
            Self::Yaml(e) => write!(f, "YAML error: {e}"),
            Self::MalformedConfig { key, context } => {
                write!(f, "Malformed plan: missing '{key}' in {context}")
            }
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_yaml_ng::Error> for LoadError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        Self::Yaml(e)
    }
}
