// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status model for one supervised agent process.
//!
//! An [`AgentStatus`] is the durable record a supervisor keeps about the
//! process it owns. It is overwritten in place on every lifecycle operation
//! and never deleted. The outcome enums are the structured results the
//! supervisor returns instead of raising — the boundary layer translates
//! them directly to response codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted lifecycle state of the supervised process.
///
/// `starting`/`stopping` are deliberately absent: callers observe them only
/// as the latency of the corresponding call, which blocks until a terminal
/// state is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    #[default]
    Stopped,
    Running,
    Error,
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentState::Stopped => write!(f, "stopped"),
            AgentState::Running => write!(f, "running"),
            AgentState::Error => write!(f, "error"),
        }
    }
}

/// Durable status record for one supervised agent process.
///
/// Invariant: `pid` is `Some` iff `state == Running` and the OS process with
/// that pid exists. A status read that finds a stale pid corrects itself to
/// `Stopped` before returning (see `Supervisor::status`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub state: AgentState,
    pub pid: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub last_restart: Option<DateTime<Utc>>,
    pub stop_time: Option<DateTime<Utc>>,
    /// Incremented on every successful start, including restarts.
    /// Failed start attempts leave it untouched.
    #[serde(default)]
    pub restart_count: u32,
    pub error_message: Option<String>,
}

impl AgentStatus {
    /// Synthetic record for a status read that failed in the store itself.
    /// Not persisted — the next read retries from disk.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: AgentState::Error,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Result of a start or restart request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartOutcome {
    /// Process confirmed alive after the confirmation window.
    Started(AgentStatus),
    /// Already running and `force_restart` was false. Status is unchanged.
    AlreadyRunning(AgentStatus),
    /// Spawn failed or the child exited inside the confirmation window.
    Failed { message: String, status: AgentStatus },
}

impl StartOutcome {
    pub fn success(&self) -> bool {
        matches!(self, StartOutcome::Started(_))
    }

    pub fn status(&self) -> &AgentStatus {
        match self {
            StartOutcome::Started(s) | StartOutcome::AlreadyRunning(s) => s,
            StartOutcome::Failed { status, .. } => status,
        }
    }
}

/// Result of a stop request. Stopping an already-stopped process is success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StopOutcome {
    Stopped(AgentStatus),
    NotRunning,
}

/// Point-in-time resource usage of the supervised process.
///
/// Lookup failures never propagate: the metrics come back zeroed with
/// `state` reflecting what the status read observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub uptime_secs: u64,
    pub memory_bytes: u64,
    pub cpu_percent: f32,
    pub state: AgentState,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
