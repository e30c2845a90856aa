//! HTTP status probe.
//!
//! URLs are classified by prefix:
//!
//! | URL                | Request                                         |
//! |--------------------|-------------------------------------------------|
//! | `http://...`       | plain GET                                       |
//! | `https://...`      | GET, certificate validation per `verify`        |
//! | anything else      | GET `<local base>/<url without leading slash>`  |
//!
//! Only the status code is inspected. Redirects follow the client default.

use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use super::condition::HttpCondition;
use super::error::EvalError;
use super::status::ProbeOutcome;

/// Default upper bound for a whole request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Base used for bare-path URLs.
pub const DEFAULT_LOCAL_BASE: &str = "http://127.0.0.1:80";

/// How a condition's URL is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpTarget {
    Plain(Url),
    Tls { url: Url, verify: bool },
    Local(Url),
}

impl HttpTarget {
    pub fn url(&self) -> &Url {
        match self {
            Self::Plain(url) | Self::Local(url) => url,
            Self::Tls { url, .. } => url,
        }
    }

    /// Whether the request may skip certificate validation.
    pub fn accepts_invalid_certs(&self) -> bool {
        matches!(self, Self::Tls { verify: false, .. })
    }
}

/// Issues one GET per condition and compares the status code.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// Validates certificates
    client: Client,
    /// `verify: false` targets only
    insecure_client: Client,
    local_base: String,
    timeout: Duration,
}

impl HttpProbe {
    /// Build the probe. Idle connections are not pooled, each request
    /// opens and closes its own.
    pub fn new(timeout: Duration, local_base: impl Into<String>) -> Result<Self, EvalError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;
        let insecure_client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            insecure_client,
            local_base: local_base.into(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify and parse the condition's URL.
    pub fn target(&self, condition: &HttpCondition) -> Result<HttpTarget, EvalError> {
        let raw = condition.url.as_str();
        let parse = |s: &str| {
            Url::parse(s).map_err(|e| EvalError::InvalidUrl {
                url: condition.url.clone(),
                message: e.to_string(),
            })
        };

        if raw.starts_with("http://") {
            Ok(HttpTarget::Plain(parse(raw)?))
        } else if raw.starts_with("https://") {
            Ok(HttpTarget::Tls {
                url: parse(raw)?,
                verify: condition.verify_tls(),
            })
        } else {
            let path = raw.strip_prefix('/').unwrap_or(raw);
            let full = format!("{}/{}", self.local_base.trim_end_matches('/'), path);
            Ok(HttpTarget::Local(parse(&full)?))
        }
    }

    /// Evaluate one condition. Only a malformed URL is an error.
    pub async fn evaluate(&self, condition: &HttpCondition) -> Result<bool, EvalError> {
        let target = self.target(condition)?;
        let outcome = self.probe(&target, condition).await;
        if let Some(reason) = outcome.reason() {
            debug!(url = %target.url(), reason, "http probe failed");
        }
        Ok(outcome.is_healthy())
    }

    /// Send the request and judge the status code.
    pub async fn probe(&self, target: &HttpTarget, condition: &HttpCondition) -> ProbeOutcome {
        let client = if target.accepts_invalid_certs() {
            &self.insecure_client
        } else {
            &self.client
        };

        match client.get(target.url().clone()).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if condition.accepts(status) {
                    ProbeOutcome::Healthy
                } else {
                    ProbeOutcome::unhealthy(format!("unexpected status {}", status))
                }
            }
            Err(e) if e.is_timeout() => {
                ProbeOutcome::unhealthy(format!("timed out after {:?}", self.timeout))
            }
            Err(e) => ProbeOutcome::unhealthy(e.to_string()),
        }
    }
}
