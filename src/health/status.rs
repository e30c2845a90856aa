//! Probe outcomes and the aggregated verdict.

use serde::Serialize;

use super::condition::{ConditionKind, FailedCondition};

/// Result of one network probe attempt.
///
/// Environmental failures (refused, timed out, unresolvable, bad
/// certificate) are an ordinary `Unhealthy` outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy(String),
}

impl ProbeOutcome {
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self::Unhealthy(reason.into())
    }

    #[inline]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Healthy => None,
            Self::Unhealthy(reason) => Some(reason),
        }
    }
}

/// Outcome of one evaluation pass.
///
/// Failing conditions are ordered process, then TCP, then HTTP, each group
/// in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthVerdict {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FailedCondition>,
}

impl HealthVerdict {
    pub fn from_errors(errors: Vec<FailedCondition>) -> Self {
        Self { errors }
    }

    /// True iff no condition failed.
    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed conditions of the given kind.
    pub fn failures_of(&self, kind: ConditionKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }
}
