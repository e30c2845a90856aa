//! Evaluation errors.
//!
//! These describe broken configuration, never an unhealthy target. A probe
//! that cannot reach its target reports `false`; it only returns an
//! [`EvalError`] when the condition itself cannot be evaluated.

use std::fmt;
use std::net::AddrParseError;

/// Error raised while evaluating conditions.
#[derive(Debug)]
pub enum EvalError {
    /// `matching` is not a valid regular expression.
    InvalidPattern { pattern: String, error: regex::Error },
    /// TCP condition without `ipAddress` or `hostname`.
    MissingAddress { port: u16 },
    /// `ipAddress` is not an IP literal.
    InvalidIpAddress {
        value: String,
        error: AddrParseError,
    },
    /// URL cannot be parsed after scheme classification.
    InvalidUrl { url: String, message: String },
    /// HTTP client could not be constructed.
    Client(reqwest::Error),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::InvalidPattern { pattern, error } => {
                write!(f, "invalid process pattern '{}': {}", pattern, error)
            }
            EvalError::MissingAddress { port } => {
                write!(f, "tcp condition for port {} has no ipAddress or hostname", port)
            }
            EvalError::InvalidIpAddress { value, error } => {
                write!(f, "invalid ipAddress '{}': {}", value, error)
            }
            EvalError::InvalidUrl { url, message } => {
                write!(f, "invalid url '{}': {}", url, message)
            }
            EvalError::Client(e) => write!(f, "failed to build HTTP client: {}", e),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalError::InvalidPattern { error, .. } => Some(error),
            EvalError::InvalidIpAddress { error, .. } => Some(error),
            EvalError::Client(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(e: reqwest::Error) -> Self {
        EvalError::Client(e)
    }
}
