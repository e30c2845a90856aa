//! Configuration error types.

use std::fmt;
use std::path::PathBuf;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Value parsed but is not acceptable.
    Invalid { key: String, message: String },
    /// Check file could not be read or created.
    Io { path: PathBuf, error: std::io::Error },
    /// Check file is not a valid check document.
    Json {
        path: PathBuf,
        error: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
            ConfigError::Io { path, error } => {
                write!(f, "IO error for '{}': {}", path.display(), error)
            }
            ConfigError::Json { path, error } => {
                write!(f, "malformed check file '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            ConfigError::Json { error, .. } => Some(error),
            _ => None,
        }
    }
}
