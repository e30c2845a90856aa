//! healthcheck_api - host health endpoint powered by Rust and Tokio.
//!
//! The daemon reads a JSON check file listing conditions the host must
//! satisfy and answers HTTP requests with a verdict:
//!
//! - **Process**: a running process with a given pid, name or command line
//! - **TCP**: an address that accepts connections
//! - **HTTP**: a URL answering with an accepted status code
//!
//! Every request evaluates all conditions afresh. Nothing is cached.
//!
//! # Architecture
//!
//! - [`health`] - condition types and the evaluation engine
//! - [`system`] - process snapshots of the host
//! - [`config`] - environment settings and the check file
//! - [`server`] - the HTTP endpoint
//! - [`logging`] - tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck_api::config::{CheckConfig, Config};
//! use healthcheck_api::health::HealthChecker;
//! use healthcheck_api::server::Server;
//! use healthcheck_api::system::SystemProcesses;
//!
//! let config = Config::from_env()?;
//! let checks = CheckConfig::load_or_bootstrap(&config.server.config_path)?;
//! let checker = HealthChecker::new(config.probe.health_config())?;
//! let addr = (config.server.listen_host, checks.port).into();
//! let server = Server::bind(addr, checks, checker, SystemProcesses)?;
//! server.run().await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod health;
pub mod logging;
pub mod server;
pub mod system;

// Re-exports for convenience
pub use config::{CheckConfig, Config};
pub use health::{HealthChecker, HealthVerdict};
pub use server::Server;
