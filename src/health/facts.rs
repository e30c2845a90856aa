//! Observed runtime state that process conditions are checked against.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheduler state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    TracingStop,
    Idle,
    Waking,
    Parked,
    Locked,
    Zombie,
    Dead,
    Unknown,
}

impl ProcessState {
    /// Zombie and dead entries never count as present.
    #[inline]
    pub fn is_alive(self) -> bool {
        !matches!(self, Self::Zombie | Self::Dead)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Sleeping => "sleeping",
            Self::DiskSleep => "disk_sleep",
            Self::Stopped => "stopped",
            Self::TracingStop => "tracing_stop",
            Self::Idle => "idle",
            Self::Waking => "waking",
            Self::Parked => "parked",
            Self::Locked => "locked",
            Self::Zombie => "zombie",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one process, captured fresh for each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessFact {
    pub pid: u32,
    pub name: String,
    pub cmdline: Vec<String>,
    pub status: ProcessState,
}

impl ProcessFact {
    /// Running process with an empty command line.
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            cmdline: Vec::new(),
            status: ProcessState::Running,
        }
    }

    pub fn with_cmdline<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmdline = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: ProcessState) -> Self {
        self.status = status;
        self
    }

    /// Command line arguments joined with single spaces.
    pub fn command_line(&self) -> String {
        self.cmdline.join(" ")
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status.is_alive()
    }
}

/// Drop zombie and dead entries from a snapshot.
pub fn retain_alive(facts: Vec<ProcessFact>) -> Vec<ProcessFact> {
    facts.into_iter().filter(ProcessFact::is_alive).collect()
}
