// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform process-control capability.
//!
//! The supervisor never touches pids directly — it goes through
//! [`ProcessControl`] so liveness checks and signals can be scripted in
//! tests without spawning real processes.

use parking_lot::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, System};
use thiserror::Error;

/// Signals the supervisor sends during shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Graceful termination (SIGTERM).
    Term,
    /// Forceful kill (SIGKILL), the escalation path.
    Kill,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to signal pid {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}

/// Point-in-time resource usage of a single process.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessStats {
    pub memory_bytes: u64,
    pub cpu_percent: f32,
}

/// OS process operations the supervisor depends on.
pub trait ProcessControl: Send + Sync {
    /// Whether a process with this pid currently exists.
    fn pid_exists(&self, pid: u32) -> bool;

    /// Send a signal. A process that is already gone is treated as success,
    /// not an error — the goal (process absent) has been reached.
    fn send_signal(&self, pid: u32, signal: SignalKind) -> Result<(), ProcessError>;

    /// Memory/CPU usage for the pid, or `None` if it cannot be observed.
    fn process_stats(&self, pid: u32) -> Option<ProcessStats>;
}

/// Real implementation: `nix` signals for lifecycle, `sysinfo` for stats.
pub struct UnixProcessControl {
    // sysinfo wants &mut for refresh; the supervisor holds &self.
    system: Mutex<System>,
}

impl UnixProcessControl {
    pub fn new() -> Self {
        Self { system: Mutex::new(System::new()) }
    }
}

impl Default for UnixProcessControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessControl for UnixProcessControl {
    fn pid_exists(&self, pid: u32) -> bool {
        // Signal 0: existence probe without delivering anything.
        nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
    }

    fn send_signal(&self, pid: u32, signal: SignalKind) -> Result<(), ProcessError> {
        let sig = match signal {
            SignalKind::Term => nix::sys::signal::Signal::SIGTERM,
            SignalKind::Kill => nix::sys::signal::Signal::SIGKILL,
        };
        match nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), sig) {
            Ok(()) => Ok(()),
            // Already gone: stopping a dead process is success.
            Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(errno) => {
                Err(ProcessError::Signal { pid, source: std::io::Error::from_raw_os_error(errno as i32) })
            }
        }
    }

    fn process_stats(&self, pid: u32) -> Option<ProcessStats> {
        let mut system = self.system.lock();
        let pid = Pid::from_u32(pid);
        if !system.refresh_process_specifics(pid, ProcessRefreshKind::new().with_cpu().with_memory())
        {
            return None;
        }
        let process = system.process(pid)?;
        Some(ProcessStats { memory_bytes: process.memory(), cpu_percent: process.cpu_usage() })
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
