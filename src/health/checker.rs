//! Aggregation of all probes into one verdict.

use std::time::Duration;

use futures_util::future::join_all;
use tracing::debug;

use super::condition::{Condition, ConditionKind, FailedCondition, Targets};
use super::error::EvalError;
use super::facts::ProcessFact;
use super::http::{HttpProbe, DEFAULT_LOCAL_BASE, DEFAULT_REQUEST_TIMEOUT};
use super::process;
use super::status::HealthVerdict;
use super::tcp::{TcpProbe, DEFAULT_CONNECT_TIMEOUT};

/// Health checker configuration.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Upper bound for resolving and connecting a TCP target
    pub tcp_timeout: Duration,
    /// Upper bound for a whole HTTP request
    pub http_timeout: Duration,
    /// Scheme, host and port prepended to bare-path HTTP conditions
    pub local_http_base: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            tcp_timeout: DEFAULT_CONNECT_TIMEOUT,
            http_timeout: DEFAULT_REQUEST_TIMEOUT,
            local_http_base: DEFAULT_LOCAL_BASE.to_string(),
        }
    }
}

/// Runs every configured condition against the supplied facts.
///
/// Holds no per-request state: each call to [`evaluate`](Self::evaluate)
/// depends only on its arguments and the network, so one checker can serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct HealthChecker {
    tcp: TcpProbe,
    http: HttpProbe,
}

impl HealthChecker {
    /// Create a new health checker.
    pub fn new(config: HealthConfig) -> Result<Self, EvalError> {
        Ok(Self {
            tcp: TcpProbe::new(config.tcp_timeout),
            http: HttpProbe::new(config.http_timeout, config.local_http_base)?,
        })
    }

    pub fn tcp_probe(&self) -> &TcpProbe {
        &self.tcp
    }

    pub fn http_probe(&self) -> &HttpProbe {
        &self.http
    }

    /// Evaluate all targets.
    ///
    /// Failing conditions are collected as process, TCP, HTTP, each in
    /// configured order. Network conditions of one kind run concurrently.
    /// An `Err` means a condition is malformed; it is never used for an
    /// unreachable target.
    pub async fn evaluate(
        &self,
        targets: &Targets,
        facts: &[ProcessFact],
    ) -> Result<HealthVerdict, EvalError> {
        let mut errors = Vec::new();

        let failed = |kind, index, condition: Condition| {
            FailedCondition::new(condition).with_source(targets.source(kind, index).cloned())
        };

        for (index, condition) in targets.target_process.iter().enumerate() {
            if !process::evaluate(condition, facts)? {
                debug!(condition = ?condition, "process condition failed");
                errors.push(failed(ConditionKind::Process, index, condition.clone().into()));
            }
        }

        let tcp_results = join_all(targets.target_tcp.iter().map(|c| self.tcp.evaluate(c))).await;
        for (index, (condition, result)) in targets.target_tcp.iter().zip(tcp_results).enumerate() {
            if !result? {
                debug!(condition = ?condition, "tcp condition failed");
                errors.push(failed(ConditionKind::Tcp, index, condition.clone().into()));
            }
        }

        let http_results =
            join_all(targets.target_http.iter().map(|c| self.http.evaluate(c))).await;
        for (index, (condition, result)) in targets.target_http.iter().zip(http_results).enumerate()
        {
            if !result? {
                debug!(condition = ?condition, "http condition failed");
                errors.push(failed(ConditionKind::Http, index, condition.clone().into()));
            }
        }

        Ok(HealthVerdict::from_errors(errors))
    }
}
