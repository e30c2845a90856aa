//! Check file: health route, status codes and target conditions.
//!
//! ```json
//! {
//!   "url": "/",
//!   "port": 5000,
//!   "statusCodeHealthy": 200,
//!   "statusCodeUnhealthy": 500,
//!   "targetProcess": [{ "name": "nginx" }, { "matching": "^/usr/bin/python .*worker" }],
//!   "targetTcp": [{ "hostname": "db.internal", "port": 5432 }],
//!   "targetHttp": [{ "url": "/status", "healthyStatusCodes": [200, 204] }]
//! }
//! ```
//!
//! `url`, `port` and both status codes are required; the target lists may
//! be omitted. Unknown keys are rejected. The snake_case keys of earlier
//! releases (`status_code_healthy`, `target_process`, ...) are accepted
//! too, and a failing condition is reported with the keys it was written
//! with.
//!
//! `matching` patterns use the `regex` crate syntax. Lookaround and
//! backreferences are not supported and fail the request as an invalid
//! pattern.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::ConfigError;
use crate::health::Targets;

/// Written when the check file does not exist yet.
pub const DEFAULT_CHECK_FILE: &str = r#"{
  "url": "/",
  "port": 5000,
  "statusCodeHealthy": 200,
  "statusCodeUnhealthy": 500,
  "targetProcess": [],
  "targetTcp": [],
  "targetHttp": []
}
"#;

/// Check file as written on disk. Conditions stay raw JSON until
/// [`Targets::from_values`] so their original spelling is kept.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CheckFile {
    url: String,
    port: u16,
    #[serde(alias = "status_code_healthy")]
    status_code_healthy: u16,
    #[serde(alias = "status_code_unhealthy")]
    status_code_unhealthy: u16,
    #[serde(default, alias = "target_process")]
    target_process: Vec<Value>,
    #[serde(default, alias = "target_tcp")]
    target_tcp: Vec<Value>,
    #[serde(default, alias = "target_http")]
    target_http: Vec<Value>,
}

/// Parsed check file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckConfig {
    /// Route answering health requests.
    pub url: String,
    /// Listen port.
    pub port: u16,
    pub status_code_healthy: u16,
    pub status_code_unhealthy: u16,
    pub targets: Targets,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            url: "/".to_string(),
            port: 5000,
            status_code_healthy: 200,
            status_code_unhealthy: 500,
            targets: Targets::default(),
        }
    }
}

impl CheckConfig {
    /// Build with the given targets and default server settings.
    pub fn with_targets(targets: Targets) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    /// Parse and validate a check document.
    pub fn from_json(path: &Path, json: &str) -> Result<Self, ConfigError> {
        let json_err = |error: serde_json::Error| ConfigError::Json {
            path: path.to_path_buf(),
            error,
        };

        let file: CheckFile = serde_json::from_str(json).map_err(json_err)?;
        let targets = Targets::from_values(file.target_process, file.target_tcp, file.target_http)
            .map_err(json_err)?;
        let config = Self {
            url: file.url,
            port: file.port,
            status_code_healthy: file.status_code_healthy,
            status_code_unhealthy: file.status_code_unhealthy,
            targets,
        };
        config.validate()?;
        Ok(config)
    }

    /// Read the check file, creating it with [`DEFAULT_CHECK_FILE`] first
    /// when it does not exist.
    pub fn load_or_bootstrap(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |error: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        };

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
            fs::write(path, DEFAULT_CHECK_FILE).map_err(io_err)?;
            info!(path = %path.display(), "created default check file");
        }

        let json = fs::read_to_string(path).map_err(io_err)?;
        Self::from_json(path, &json)
    }

    /// Check server-level settings. Conditions are left to evaluation time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url.starts_with('/') {
            return Err(ConfigError::Invalid {
                key: "url".into(),
                message: format!("route '{}' must start with '/'", self.url),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                key: "port".into(),
                message: "port must not be 0".into(),
            });
        }
        for (key, code) in [
            ("statusCodeHealthy", self.status_code_healthy),
            ("statusCodeUnhealthy", self.status_code_unhealthy),
        ] {
            if !(100..=999).contains(&code) {
                return Err(ConfigError::Invalid {
                    key: key.into(),
                    message: format!("{} is not an HTTP status code", code),
                });
            }
        }
        Ok(())
    }
}
