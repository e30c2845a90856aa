//! Server configuration.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use super::parse::{env_opt, env_parse, env_timeout};
use super::ConfigError;

/// Default location of the check file.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Server configuration loaded from environment.
///
/// The listen port and health route live in the check file, this covers
/// what is specific to the host the daemon runs on.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Path of the JSON check file (default: config.json).
    pub config_path: PathBuf,
    /// Bind address (default: 0.0.0.0).
    pub listen_host: IpAddr,
    /// Grace period for in-flight requests on shutdown (default: 5s).
    pub drain_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            config_path: env_opt("CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            listen_host: env_parse("LISTEN_HOST", IpAddr::from([0, 0, 0, 0]))?,
            drain_timeout: env_timeout("DRAIN_TIMEOUT", "5s")?,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            listen_host: IpAddr::from([0, 0, 0, 0]),
            drain_timeout: Duration::from_secs(5),
        }
    }
}
