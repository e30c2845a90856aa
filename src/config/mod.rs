//! Configuration module for healthcheck_api.
//!
//! Runtime settings come from environment variables; the conditions to
//! check come from the JSON check file named by `CONFIG_PATH`.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck_api::config::{CheckConfig, Config};
//!
//! let config = Config::from_env()?;
//! let checks = CheckConfig::load_or_bootstrap(&config.server.config_path)?;
//! println!("Health route: {} on port {}", checks.url, checks.port);
//! ```

mod checks;
mod error;
mod logging;
mod parse;
mod probe;
mod server;

pub use checks::{CheckConfig, DEFAULT_CHECK_FILE};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig, DEFAULT_LOG_FILTER};
pub use parse::parse_duration;
pub use probe::ProbeConfig;
pub use server::{ServerConfig, DEFAULT_CONFIG_PATH};

/// Complete runtime configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Probe configuration.
    pub probe: ProbeConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            probe: ProbeConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self, checks: &CheckConfig) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Check file: {}", self.server.config_path.display());
        info!(
            "  Listen: {}:{} (route {})",
            self.server.listen_host, checks.port, checks.url
        );
        info!(
            "  Status codes: healthy={}, unhealthy={}",
            checks.status_code_healthy, checks.status_code_unhealthy
        );
        info!(
            "  Targets: {} process, {} tcp, {} http",
            checks.targets.target_process.len(),
            checks.targets.target_tcp.len(),
            checks.targets.target_http.len()
        );
        info!(
            "  Probe timeouts: tcp={:?}, http={:?}",
            self.probe.tcp_timeout, self.probe.http_timeout
        );
        info!("  Local HTTP base: {}", self.probe.local_http_base);
        info!("  Drain timeout: {:?}", self.server.drain_timeout);

        if checks.targets.is_empty() {
            info!("  No targets configured, every request reports healthy");
        }
    }
}
