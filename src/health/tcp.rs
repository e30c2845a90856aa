//! TCP reachability probe.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::{lookup_host, TcpStream};
use tracing::debug;

use super::condition::TcpCondition;
use super::error::EvalError;
use super::status::ProbeOutcome;

/// Default upper bound for resolve + connect.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a TCP condition points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcpTarget {
    /// `ipAddress` literal, used as is.
    Addr(SocketAddr),
    /// `hostname`, resolved on every probe.
    Host(String, u16),
}

impl TcpTarget {
    /// Pick the target for a condition. `ipAddress` wins over `hostname`.
    pub fn from_condition(condition: &TcpCondition) -> Result<Self, EvalError> {
        if let Some(ref value) = condition.ip_address {
            let ip: IpAddr = value
                .trim()
                .parse()
                .map_err(|error| EvalError::InvalidIpAddress {
                    value: value.clone(),
                    error,
                })?;
            return Ok(Self::Addr(SocketAddr::new(ip, condition.port)));
        }

        match condition.hostname {
            Some(ref host) => Ok(Self::Host(host.clone(), condition.port)),
            None => Err(EvalError::MissingAddress {
                port: condition.port,
            }),
        }
    }
}

/// Connects to the target and closes the connection straight away.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    connect_timeout: Duration,
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl TcpProbe {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Evaluate one condition. Only a malformed condition is an error.
    pub async fn evaluate(&self, condition: &TcpCondition) -> Result<bool, EvalError> {
        let target = TcpTarget::from_condition(condition)?;
        let outcome = self.probe(&target).await;
        if let Some(reason) = outcome.reason() {
            debug!(endpoint = ?target, reason, "tcp probe failed");
        }
        Ok(outcome.is_healthy())
    }

    /// Resolve (if needed) and connect within the timeout.
    pub async fn probe(&self, target: &TcpTarget) -> ProbeOutcome {
        match tokio::time::timeout(self.connect_timeout, connect(target)).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::unhealthy(format!(
                "timed out after {:?}",
                self.connect_timeout
            )),
        }
    }
}

async fn connect(target: &TcpTarget) -> ProbeOutcome {
    let addrs: Vec<SocketAddr> = match target {
        TcpTarget::Addr(addr) => vec![*addr],
        TcpTarget::Host(host, port) => match lookup_host((host.as_str(), *port)).await {
            Ok(resolved) => resolved.collect(),
            Err(e) => return ProbeOutcome::unhealthy(format!("cannot resolve {}: {}", host, e)),
        },
    };

    if addrs.is_empty() {
        return ProbeOutcome::unhealthy("no addresses resolved");
    }

    match TcpStream::connect(&addrs[..]).await {
        // Dropping the stream closes it
        Ok(_stream) => ProbeOutcome::Healthy,
        Err(e) => ProbeOutcome::unhealthy(e.to_string()),
    }
}
