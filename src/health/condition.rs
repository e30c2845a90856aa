//! Check definitions.
//!
//! Every optional sub-field is an `Option` so that "absent" stays
//! distinguishable from "present but false/empty". Conditions are plain
//! data: nothing is validated when they are deserialized, defects such as
//! a broken regular expression surface when the condition is evaluated.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Status code accepted when a condition does not list its own.
pub const DEFAULT_HEALTHY_STATUS: u16 = 200;

/// Requires at least one running process matching `pid`, `name` or `matching`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProcessCondition {
    /// Exact process id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Exact, case-sensitive process name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Regular expression matched from the start of the space-joined cmdline.
    /// Uses `regex` crate syntax, which has no lookaround or backreferences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching: Option<String>,
}

impl ProcessCondition {
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_matching(mut self, pattern: impl Into<String>) -> Self {
        self.matching = Some(pattern.into());
        self
    }

    /// True when no sub-check is enabled.
    pub fn is_empty(&self) -> bool {
        self.pid.is_none() && self.name.is_none() && self.matching.is_none()
    }
}

/// Requires a TCP endpoint to accept connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TcpCondition {
    pub port: u16,
    /// IP literal, used verbatim. Takes precedence over `hostname`.
    #[serde(
        default,
        alias = "ip_address",
        skip_serializing_if = "Option::is_none"
    )]
    pub ip_address: Option<String>,
    /// Name resolved through DNS on every evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl TcpCondition {
    pub fn with_ip(ip_address: impl Into<String>, port: u16) -> Self {
        Self {
            port,
            ip_address: Some(ip_address.into()),
            hostname: None,
        }
    }

    pub fn with_hostname(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            port,
            ip_address: None,
            hostname: Some(hostname.into()),
        }
    }
}

/// Requires an HTTP endpoint to answer with an accepted status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HttpCondition {
    /// Absolute `http://`/`https://` URL, or a bare path on the local endpoint.
    pub url: String,
    #[serde(
        default,
        alias = "healthy_status_codes",
        skip_serializing_if = "Option::is_none"
    )]
    pub healthy_status_codes: Option<Vec<u16>>,
    /// TLS certificate validation for `https://` targets (default: true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
}

impl HttpCondition {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            healthy_status_codes: None,
            verify: None,
        }
    }

    pub fn with_status_codes(mut self, codes: impl Into<Vec<u16>>) -> Self {
        self.healthy_status_codes = Some(codes.into());
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Whether certificates must be validated. Only an explicit `false` disables it.
    #[inline]
    pub fn verify_tls(&self) -> bool {
        self.verify.unwrap_or(true)
    }

    /// Whether `status` counts as healthy for this condition.
    pub fn accepts(&self, status: u16) -> bool {
        match self.healthy_status_codes {
            Some(ref codes) => codes.contains(&status),
            None => status == DEFAULT_HEALTHY_STATUS,
        }
    }
}

/// All configured conditions, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    pub target_process: Vec<ProcessCondition>,
    pub target_tcp: Vec<TcpCondition>,
    pub target_http: Vec<HttpCondition>,
    /// Conditions as written in the check file. Empty for targets built in code.
    pub sources: TargetSources,
}

/// JSON of each condition exactly as configured, index-aligned with the
/// typed lists of [`Targets`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSources {
    pub process: Vec<Value>,
    pub tcp: Vec<Value>,
    pub http: Vec<Value>,
}

impl Targets {
    /// Parse the three condition lists of a check file, keeping each
    /// condition's original JSON for error reporting.
    pub fn from_values(
        process: Vec<Value>,
        tcp: Vec<Value>,
        http: Vec<Value>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            target_process: parse_all(&process)?,
            target_tcp: parse_all(&tcp)?,
            target_http: parse_all(&http)?,
            sources: TargetSources { process, tcp, http },
        })
    }

    pub fn is_empty(&self) -> bool {
        self.target_process.is_empty() && self.target_tcp.is_empty() && self.target_http.is_empty()
    }

    pub fn len(&self) -> usize {
        self.target_process.len() + self.target_tcp.len() + self.target_http.len()
    }

    /// Original JSON of the `index`-th condition of `kind`, if known.
    pub fn source(&self, kind: ConditionKind, index: usize) -> Option<&Value> {
        let list = match kind {
            ConditionKind::Process => &self.sources.process,
            ConditionKind::Tcp => &self.sources.tcp,
            ConditionKind::Http => &self.sources.http,
        };
        list.get(index)
    }
}

fn parse_all<T: DeserializeOwned>(values: &[Value]) -> Result<Vec<T>, serde_json::Error> {
    values.iter().map(T::deserialize).collect()
}

/// Condition kinds, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Process,
    Tcp,
    Http,
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::Tcp => write!(f, "tcp"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// A single condition of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Condition {
    Process(ProcessCondition),
    Tcp(TcpCondition),
    Http(HttpCondition),
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Process(_) => ConditionKind::Process,
            Self::Tcp(_) => ConditionKind::Tcp,
            Self::Http(_) => ConditionKind::Http,
        }
    }
}

impl From<ProcessCondition> for Condition {
    fn from(condition: ProcessCondition) -> Self {
        Self::Process(condition)
    }
}

impl From<TcpCondition> for Condition {
    fn from(condition: TcpCondition) -> Self {
        Self::Tcp(condition)
    }
}

impl From<HttpCondition> for Condition {
    fn from(condition: HttpCondition) -> Self {
        Self::Http(condition)
    }
}

/// A condition that did not hold.
///
/// Serializes as the JSON the condition was configured with, key spelling
/// included, so operators can match it against their check file. Conditions
/// built in code fall back to their canonical camelCase form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCondition {
    pub condition: Condition,
    pub source: Option<Value>,
}

impl FailedCondition {
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self {
            condition: condition.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<Value>) -> Self {
        self.source = source;
        self
    }

    pub fn kind(&self) -> ConditionKind {
        self.condition.kind()
    }
}

impl Serialize for FailedCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.source {
            Some(ref source) => source.serialize(serializer),
            None => self.condition.serialize(serializer),
        }
    }
}
