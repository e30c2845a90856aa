//! Probe configuration.

use std::time::Duration;

use super::parse::{env_or, env_timeout};
use super::ConfigError;
use crate::health::HealthConfig;

/// Timeouts and defaults for outbound probes.
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// TCP resolve + connect bound (TCP_TIMEOUT, default: 10s).
    pub tcp_timeout: Duration,
    /// HTTP request bound (HTTP_TIMEOUT, default: 10s).
    pub http_timeout: Duration,
    /// Base for bare-path HTTP conditions (LOCAL_HTTP_BASE).
    pub local_http_base: String,
}

impl ProbeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let local_http_base = env_or("LOCAL_HTTP_BASE", crate::health::http::DEFAULT_LOCAL_BASE);
        if !local_http_base.starts_with("http://") && !local_http_base.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "LOCAL_HTTP_BASE".into(),
                message: format!("'{}' must start with http:// or https://", local_http_base),
            });
        }

        Ok(Self {
            tcp_timeout: env_timeout("TCP_TIMEOUT", "10s")?,
            http_timeout: env_timeout("HTTP_TIMEOUT", "10s")?,
            local_http_base,
        })
    }

    /// Settings for the [`HealthChecker`](crate::health::HealthChecker).
    pub fn health_config(&self) -> HealthConfig {
        HealthConfig {
            tcp_timeout: self.tcp_timeout,
            http_timeout: self.http_timeout,
            local_http_base: self.local_http_base.clone(),
        }
    }
}
