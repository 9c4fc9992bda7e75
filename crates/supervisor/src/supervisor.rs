// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent process supervision: start, stop, liveness verification, metrics.
//!
//! Calls here are synchronous in spirit — `start` and `stop` deliberately
//! wait out their confirmation/grace windows so the caller gets a terminal,
//! verified state rather than an optimistic acknowledgment. Callers that
//! need responsiveness run them off the hot path and poll `status()`.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use vox_core::{AgentMetrics, AgentState, AgentStatus, StartOutcome, StopOutcome};

use crate::process::{ProcessControl, SignalKind};
use crate::store::StatusStore;

/// Supervisor tuning. The defaults mirror production behavior; tests dial
/// the windows down to keep runs fast.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Agent executable.
    pub command: String,
    pub args: Vec<String>,
    /// Working directory for the agent; inherited from the supervisor when `None`.
    pub working_dir: Option<PathBuf>,
    /// Where the durable status record lives.
    pub status_path: PathBuf,
    /// The agent's log sink, for `recent_logs`.
    pub log_path: PathBuf,
    /// How long after spawn to re-check the child before declaring success.
    /// Agent runtimes can fail fast (bad credentials, missing config) — a
    /// bare "spawn succeeded" would falsely report those as running.
    pub confirm_delay: Duration,
    /// Wait after SIGTERM before escalating.
    pub stop_grace: Duration,
    /// Wait after SIGKILL before declaring the process stopped.
    pub kill_grace: Duration,
    /// Pause between stop and relaunch on a forced restart.
    pub restart_pause: Duration,
}

impl SupervisorConfig {
    pub fn new(
        command: impl Into<String>,
        status_path: impl Into<PathBuf>,
        log_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
            status_path: status_path.into(),
            log_path: log_path.into(),
            confirm_delay: Duration::from_secs(2),
            stop_grace: Duration::from_secs(5),
            kill_grace: Duration::from_secs(2),
            restart_pause: Duration::from_secs(2),
        }
    }
}

/// Supervises one agent process against the real OS process table.
pub struct Supervisor<P: ProcessControl> {
    config: SupervisorConfig,
    store: StatusStore,
    platform: P,
}

impl<P: ProcessControl> Supervisor<P> {
    pub fn new(config: SupervisorConfig, platform: P) -> Self {
        let store = StatusStore::new(config.status_path.clone());
        Self { config, store, platform }
    }

    /// Self-healing status read.
    ///
    /// A persisted `running` record whose pid no longer exists is corrected
    /// to `stopped` (with the correction persisted) before returning. Store
    /// failures are absorbed into a synthetic error record.
    pub fn status(&self) -> AgentStatus {
        let mut status = match self.store.load() {
            Ok(status) => status,
            Err(e) => {
                error!(error = %e, "failed to read agent status");
                return AgentStatus::error(e.to_string());
            }
        };

        if status.state == AgentState::Running {
            let alive = status.pid.is_some_and(|pid| self.platform.pid_exists(pid));
            if !alive {
                status.state = AgentState::Stopped;
                status.pid = None;
                status.error_message = Some("process not found".to_string());
                if let Err(e) = self.store.save(&status) {
                    warn!(error = %e, "failed to persist status correction");
                }
            }
        }

        status
    }

    /// Start the agent, waiting out the confirmation window.
    ///
    /// Running + `!force_restart` is a non-fatal `AlreadyRunning`. A forced
    /// restart stops the old process first and pauses before relaunching.
    pub async fn start(&self, force_restart: bool) -> StartOutcome {
        let current = self.status();

        if current.state == AgentState::Running {
            if !force_restart {
                return StartOutcome::AlreadyRunning(current);
            }
            self.stop().await;
            tokio::time::sleep(self.config.restart_pause).await;
        }

        let mut cmd = tokio::process::Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());
        if let Some(ref dir) = self.config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return self.record_start_failure(
                    &current,
                    format!("failed to spawn agent: {e}"),
                );
            }
        };
        let pid = child.id();

        // Let fast failures surface before declaring success.
        tokio::time::sleep(self.config.confirm_delay).await;

        match child.try_wait() {
            Ok(None) => {
                let Some(pid) = pid else {
                    // try_wait said alive, so the pid must be known; treat a
                    // missing one as a failed start rather than guessing.
                    return self.record_start_failure(
                        &current,
                        "agent spawned without an observable pid".to_string(),
                    );
                };

                // Reap the child in the background to avoid a zombie.
                tokio::spawn(async move {
                    match child.wait_with_output().await {
                        Ok(output) => info!(pid, exit_status = %output.status, "agent exited"),
                        Err(e) => warn!(pid, error = %e, "failed to wait on agent"),
                    }
                });

                let now = Utc::now();
                let status = AgentStatus {
                    state: AgentState::Running,
                    pid: Some(pid),
                    start_time: Some(now),
                    last_restart: Some(now),
                    stop_time: current.stop_time,
                    restart_count: current.restart_count + 1,
                    error_message: None,
                };
                if let Err(e) = self.store.save(&status) {
                    warn!(error = %e, "failed to persist running status");
                }
                info!(pid, restart_count = status.restart_count, "agent started");
                StartOutcome::Started(status)
            }
            Ok(Some(exit)) => {
                // Died inside the confirmation window; capture its output.
                let detail = match child.wait_with_output().await {
                    Ok(output) => {
                        let stderr = String::from_utf8_lossy(&output.stderr);
                        let stdout = String::from_utf8_lossy(&output.stdout);
                        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
                        detail.trim().to_string()
                    }
                    Err(e) => format!("(output unavailable: {e})"),
                };
                self.record_start_failure(
                    &current,
                    format!("agent exited during startup ({exit}): {detail}"),
                )
            }
            Err(e) => {
                self.record_start_failure(&current, format!("failed to poll spawned agent: {e}"))
            }
        }
    }

    /// Stop the agent: SIGTERM, bounded wait, SIGKILL escalation.
    ///
    /// Idempotent — not running (for any prior state) is success with no
    /// side effects. Always persists `stopped` afterward, whichever signal
    /// path was taken.
    pub async fn stop(&self) -> StopOutcome {
        let current = self.status();
        if current.state != AgentState::Running {
            return StopOutcome::NotRunning;
        }

        if let Some(pid) = current.pid {
            if let Err(e) = self.platform.send_signal(pid, SignalKind::Term) {
                warn!(pid, error = %e, "graceful termination signal failed");
            }
            tokio::time::sleep(self.config.stop_grace).await;

            if self.platform.pid_exists(pid) {
                warn!(pid, "agent ignored SIGTERM, escalating to SIGKILL");
                if let Err(e) = self.platform.send_signal(pid, SignalKind::Kill) {
                    warn!(pid, error = %e, "forceful kill signal failed");
                }
                tokio::time::sleep(self.config.kill_grace).await;
            }
            info!(pid, "agent stopped");
        }

        let status = AgentStatus {
            state: AgentState::Stopped,
            pid: None,
            start_time: current.start_time,
            last_restart: current.last_restart,
            stop_time: Some(Utc::now()),
            restart_count: current.restart_count,
            error_message: None,
        };
        if let Err(e) = self.store.save(&status) {
            warn!(error = %e, "failed to persist stopped status");
        }
        StopOutcome::Stopped(status)
    }

    /// Stop (if needed) and relaunch.
    pub async fn restart(&self) -> StartOutcome {
        info!("restarting agent");
        self.start(true).await
    }

    /// Resource metrics for the supervised process.
    ///
    /// Never fails: lookup problems come back as zeroed metrics with `state`
    /// reflecting what the status read observed.
    pub fn metrics(&self) -> AgentMetrics {
        let status = self.status();
        let mut metrics = AgentMetrics { state: status.state, ..AgentMetrics::default() };

        if status.state != AgentState::Running {
            return metrics;
        }

        if let Some(start) = status.start_time {
            metrics.uptime_secs = (Utc::now() - start).num_seconds().max(0) as u64;
        }
        if let Some(stats) = status.pid.and_then(|pid| self.platform.process_stats(pid)) {
            metrics.memory_bytes = stats.memory_bytes;
            metrics.cpu_percent = stats.cpu_percent;
        }

        metrics
    }

    /// Last `lines` lines of the agent's log sink.
    pub fn recent_logs(&self, lines: usize) -> String {
        match std::fs::read_to_string(&self.config.log_path) {
            Ok(contents) => {
                let all: Vec<&str> = contents.lines().collect();
                let start = all.len().saturating_sub(lines);
                all[start..].join("\n")
            }
            Err(_) => "no agent logs found".to_string(),
        }
    }

    fn record_start_failure(&self, previous: &AgentStatus, message: String) -> StartOutcome {
        error!(message = %message, "agent start failed");
        let status = AgentStatus {
            state: AgentState::Error,
            pid: None,
            start_time: None,
            last_restart: Some(Utc::now()),
            stop_time: previous.stop_time,
            restart_count: previous.restart_count,
            error_message: Some(message.clone()),
        };
        if let Err(e) = self.store.save(&status) {
            warn!(error = %e, "failed to persist error status");
        }
        StartOutcome::Failed { message, status }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
