//! Structured error types for configuration loading and lookup.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Structural errors
    MergeConflict,
    NonMappingDocument,

    // Source errors
    ConfigSourceMissing,
    IoError,
    ParseError,

    // Lookup errors
    PathNotFound,
    InvalidPath,
    DeserializeError,
}

/// Errors raised while assembling or reading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two values could not be combined.
    #[error("cannot merge {incoming} into {existing} at '{key}': {reason}")]
    Merge {
        /// Dotted path of the conflict, empty at the root.
        key: String,
        existing: &'static str,
        incoming: &'static str,
        reason: &'static str,
    },

    /// The mandatory container config directory produced nothing.
    #[error("no configuration loaded from {}: {reason}", .dir.display())]
    Source { dir: PathBuf, reason: String },

    #[error("configuration path '{path}' not found (missing '{segment}')")]
    PathNotFound { path: String, segment: String },

    #[error("cannot fetch path '{path}': '{at}' is a {found}, not a mapping")]
    InvalidPath {
        path: String,
        /// Prefix of `path` that resolved to the non-mapping value.
        at: String,
        found: &'static str,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Structured documents must have a mapping at the root.
    #[error("{name} must contain a mapping at the root, found {found}")]
    NonMappingDocument { name: String, found: &'static str },

    #[error("value at '{path}' has the wrong shape: {source}")]
    Deserialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::Merge { .. } => ErrorCode::MergeConflict,
            ConfigError::Source { .. } => ErrorCode::ConfigSourceMissing,
            ConfigError::PathNotFound { .. } => ErrorCode::PathNotFound,
            ConfigError::InvalidPath { .. } => ErrorCode::InvalidPath,
            ConfigError::Io { .. } => ErrorCode::IoError,
            ConfigError::Parse { .. } => ErrorCode::ParseError,
            ConfigError::NonMappingDocument { .. } => ErrorCode::NonMappingDocument,
            ConfigError::Deserialize { .. } => ErrorCode::DeserializeError,
        }
    }

    // Convenience constructors

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn source_missing(dir: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConfigError::Source {
            dir: dir.into(),
            reason: reason.into(),
        }
    }

    /// True for the one lookup outcome presence checks treat as `false`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::PathNotFound { .. })
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
