// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet status model: per-tenant check results and the fleet-wide overview.
//!
//! The defining property of this layer is isolation — one tenant's failure
//! is a value here (`TenantOutcome::Failed`, `RemoteAgentState::ApiUnreachable`),
//! never an aborted batch. A fleet view always renders a row per tenant.

use crate::status::AgentMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Power state of a tenant's compute instance, as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComputeState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
    Unknown,
}

impl ComputeState {
    /// Map a provider's power-state label onto the enum.
    pub fn from_provider_label(label: &str) -> Self {
        match label {
            "pending" => ComputeState::Pending,
            "running" => ComputeState::Running,
            "stopping" => ComputeState::Stopping,
            "stopped" => ComputeState::Stopped,
            "shutting-down" => ComputeState::ShuttingDown,
            "terminated" => ComputeState::Terminated,
            _ => ComputeState::Unknown,
        }
    }

    /// A tenant counts as a failed instance iff its compute state is one of
    /// stopped, stopping, or terminated.
    pub fn is_failed(&self) -> bool {
        matches!(self, ComputeState::Stopped | ComputeState::Stopping | ComputeState::Terminated)
    }
}

impl std::fmt::Display for ComputeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ComputeState::Pending => "pending",
            ComputeState::Running => "running",
            ComputeState::Stopping => "stopping",
            ComputeState::Stopped => "stopped",
            ComputeState::ShuttingDown => "shutting-down",
            ComputeState::Terminated => "terminated",
            ComputeState::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Agent state as observed (or not) through a tenant's management endpoint.
///
/// `ApiUnreachable` and `ApiError` are degraded values, not faults: network
/// failure to one tenant must stay distinguishable from "agent genuinely
/// down" and must never raise to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteAgentState {
    Running,
    Stopped,
    Error,
    Unknown,
    /// The endpoint could not be reached at all (timeout, connect failure,
    /// or no resolved address).
    ApiUnreachable,
    /// The endpoint answered, but not usefully (non-2xx or malformed body).
    ApiError,
}

impl RemoteAgentState {
    /// Parse the `agent_status` label from a health response body.
    pub fn from_label(label: &str) -> Self {
        match label {
            "running" => RemoteAgentState::Running,
            "stopped" => RemoteAgentState::Stopped,
            "error" => RemoteAgentState::Error,
            _ => RemoteAgentState::Unknown,
        }
    }
}

impl std::fmt::Display for RemoteAgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RemoteAgentState::Running => "running",
            RemoteAgentState::Stopped => "stopped",
            RemoteAgentState::Error => "error",
            RemoteAgentState::Unknown => "unknown",
            RemoteAgentState::ApiUnreachable => "api_unreachable",
            RemoteAgentState::ApiError => "api_error",
        };
        write!(f, "{label}")
    }
}

/// Everything one status check learned about one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetStatus {
    pub customer_id: String,
    pub customer_name: String,
    pub compute_state: ComputeState,
    pub agent_state: RemoteAgentState,
    pub instance_address: String,
    /// Present only when the metrics follow-up call succeeded.
    pub metrics: Option<AgentMetrics>,
    pub checked_at: DateTime<Utc>,
}

/// Per-tenant element of a bulk status check, in registry enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantStatus {
    pub customer_id: String,
    pub outcome: TenantOutcome,
}

/// Either a full status or the captured reason it couldn't be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TenantOutcome {
    Status(FleetStatus),
    Failed { error: String },
    /// The caller's budget expired before this tenant's check finished.
    TimedOut,
}

/// Per-tenant element of a bulk action result map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    Ok,
    Failed { error: String },
    TimedOut,
}

/// Fleet-wide action dispatched per tenant by `bulk_action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FleetAction {
    Start,
    Stop,
    Restart,
}

impl std::fmt::Display for FleetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FleetAction::Start => write!(f, "start"),
            FleetAction::Stop => write!(f, "stop"),
            FleetAction::Restart => write!(f, "restart"),
        }
    }
}

impl std::str::FromStr for FleetAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(FleetAction::Start),
            "stop" => Ok(FleetAction::Stop),
            "restart" => Ok(FleetAction::Restart),
            other => Err(format!("unknown action '{other}' (expected start, stop, or restart)")),
        }
    }
}

/// Aggregated fleet view. The three counts are independent: a tenant can be
/// a running instance with a non-running agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetOverview {
    pub total_customers: usize,
    pub running_instances: usize,
    pub active_agents: usize,
    pub failed_instances: usize,
    /// One row per tenant, failures inline — never truncated.
    pub rows: Vec<TenantStatus>,
}

impl FleetOverview {
    pub fn from_results(total_customers: usize, rows: Vec<TenantStatus>) -> Self {
        let mut overview = FleetOverview { total_customers, ..Self::default() };
        for row in &rows {
            if let TenantOutcome::Status(status) = &row.outcome {
                if status.compute_state == ComputeState::Running {
                    overview.running_instances += 1;
                }
                if status.agent_state == RemoteAgentState::Running {
                    overview.active_agents += 1;
                }
                if status.compute_state.is_failed() {
                    overview.failed_instances += 1;
                }
            }
        }
        overview.rows = rows;
        overview
    }
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
