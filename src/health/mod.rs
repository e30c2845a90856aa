//! Probe evaluation engine.
//!
//! Three kinds of conditions are supported:
//! - **Process**: some running process has the given pid, name, or a
//!   command line matching a pattern from its start
//! - **TCP**: an address accepts a connection within the timeout
//! - **HTTP**: a GET answers with an accepted status code
//!
//! All conditions must hold for the target to be healthy. Failing
//! conditions are returned unchanged so operators see which rule broke.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck_api::health::{HealthChecker, HealthConfig, ProcessCondition, Targets};
//!
//! let checker = HealthChecker::new(HealthConfig::default())?;
//! let targets = Targets {
//!     target_process: vec![ProcessCondition::default().with_name("nginx")],
//!     ..Targets::default()
//! };
//! let verdict = checker.evaluate(&targets, &snapshot).await?;
//! assert!(verdict.is_healthy());
//! ```

mod checker;
mod condition;
mod error;
mod facts;
pub mod http;
pub mod process;
mod status;
pub mod tcp;

pub use checker::{HealthChecker, HealthConfig};
pub use condition::{
    Condition, ConditionKind, FailedCondition, HttpCondition, ProcessCondition, TargetSources,
    TcpCondition, Targets, DEFAULT_HEALTHY_STATUS,
};
pub use error::EvalError;
pub use facts::{retain_alive, ProcessFact, ProcessState};
pub use http::{HttpProbe, HttpTarget};
pub use status::{HealthVerdict, ProbeOutcome};
pub use tcp::{TcpProbe, TcpTarget};
