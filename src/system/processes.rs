//! Process enumeration.

use std::ffi::OsString;

use sysinfo::{ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

use crate::health::{ProcessFact, ProcessState};

/// Supplies the process snapshot for one health request.
pub trait ProcessSource: Send + Sync + 'static {
    /// Capture the processes visible right now.
    ///
    /// Entries that cannot be read are left out; the call itself never fails.
    fn snapshot(&self) -> Vec<ProcessFact>;
}

/// Live processes of the host, read through `sysinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessSource for SystemProcesses {
    fn snapshot(&self) -> Vec<ProcessFact> {
        let mut system = System::new();
        let refresh = ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always);
        system.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);

        let mut facts: Vec<ProcessFact> = system
            .processes()
            .iter()
            .filter_map(|(pid, process)| {
                // Linux lists threads as tasks next to their process
                if process.thread_kind().is_some() {
                    return None;
                }
                let name = process.name().to_string_lossy().into_owned();
                let cmdline = process.cmd().iter().map(lossy).collect::<Vec<_>>();
                // Exited between listing and reading
                if name.is_empty() && cmdline.is_empty() {
                    return None;
                }
                Some(ProcessFact {
                    pid: pid.as_u32(),
                    name,
                    cmdline,
                    status: map_status(process.status()),
                })
            })
            .collect();

        facts.sort_by_key(|f| f.pid);
        debug!(count = facts.len(), "process snapshot captured");
        facts
    }
}

/// A fixed snapshot, returned as is on every call.
#[derive(Debug, Clone, Default)]
pub struct FixedProcesses(pub Vec<ProcessFact>);

impl ProcessSource for FixedProcesses {
    fn snapshot(&self) -> Vec<ProcessFact> {
        self.0.clone()
    }
}

fn lossy(arg: &OsString) -> String {
    arg.to_string_lossy().into_owned()
}

#[allow(unreachable_patterns)]
fn map_status(status: ProcessStatus) -> ProcessState {
    match status {
        ProcessStatus::Run => ProcessState::Running,
        ProcessStatus::Sleep => ProcessState::Sleeping,
        ProcessStatus::UninterruptibleDiskSleep => ProcessState::DiskSleep,
        ProcessStatus::Stop => ProcessState::Stopped,
        ProcessStatus::Tracing => ProcessState::TracingStop,
        ProcessStatus::Idle => ProcessState::Idle,
        ProcessStatus::Waking | ProcessStatus::Wakekill => ProcessState::Waking,
        ProcessStatus::Parked => ProcessState::Parked,
        ProcessStatus::LockBlocked => ProcessState::Locked,
        ProcessStatus::Zombie => ProcessState::Zombie,
        ProcessStatus::Dead => ProcessState::Dead,
        _ => ProcessState::Unknown,
    }
}
