// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet-wide orchestration over many remote tenant deployments.
//!
//! Every remote call carries a fixed per-call timeout, so one hung node
//! costs at most its budget. Bulk operations fan out one task per tenant
//! and join them in registry enumeration order; a tenant's failure becomes
//! a value in its own row and never aborts a sibling.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use indexmap::IndexMap;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use vox_core::{
    ActionOutcome, AgentConfig, ComputeState, CustomerRecord, FleetAction, FleetOverview,
    FleetStatus, RemoteAgentState, TenantOutcome, TenantStatus,
};

use crate::compute::ComputeControl;
use crate::credentials::resolve_bearer_token;
use crate::http;
use crate::registry::{FleetRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("customer not found: {0}")]
    CustomerNotFound(String),
    #[error(transparent)]
    Compute(#[from] crate::compute::ComputeError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("config serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-call budgets for remote tenant operations.
#[derive(Debug, Clone, Copy)]
pub struct FleetTimeouts {
    pub health: Duration,
    pub metrics: Duration,
    pub deploy: Duration,
    pub restart: Duration,
}

impl Default for FleetTimeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(10),
            metrics: Duration::from_secs(10),
            deploy: Duration::from_secs(30),
            restart: Duration::from_secs(60),
        }
    }
}

struct Inner {
    registry: Arc<FleetRegistry>,
    compute: Arc<dyn ComputeControl>,
    timeouts: FleetTimeouts,
    /// Root for per-tenant credential files (`tokens/<ref>.token`).
    state_dir: PathBuf,
}

/// Central controller over the whole fleet. Cheap to clone; clones share
/// the registry and compute collaborator, which is how bulk operations
/// hand each spawned per-tenant task its own handle.
#[derive(Clone)]
pub struct FleetController {
    inner: Arc<Inner>,
}

impl FleetController {
    pub fn new(
        registry: Arc<FleetRegistry>,
        compute: Arc<dyn ComputeControl>,
        timeouts: FleetTimeouts,
        state_dir: impl Into<PathBuf>,
    ) -> Self {
        Self { inner: Arc::new(Inner { registry, compute, timeouts, state_dir: state_dir.into() }) }
    }

    pub fn registry(&self) -> &FleetRegistry {
        &self.inner.registry
    }

    fn record(&self, customer_id: &str) -> Result<CustomerRecord, FleetError> {
        self.inner
            .registry
            .get(customer_id)
            .ok_or_else(|| FleetError::CustomerNotFound(customer_id.to_string()))
    }

    /// Full picture of one tenant: compute power state, then — only when the
    /// instance is powered on — the agent's own word via its health endpoint.
    ///
    /// Remote reachability failures degrade `agent_state` instead of
    /// erroring: transport failures (timeout, refused, no address) map to
    /// `ApiUnreachable`; an endpoint that answered but refused or returned
    /// garbage maps to `ApiError`.
    pub async fn check_instance_status(
        &self,
        customer_id: &str,
    ) -> Result<FleetStatus, FleetError> {
        let record = self.record(customer_id)?;
        let description =
            self.inner.compute.describe_instance(&record.compute_instance_id).await?;

        let mut status = FleetStatus {
            customer_id: record.customer_id.clone(),
            customer_name: record.customer_name.clone(),
            compute_state: description.power_state,
            agent_state: RemoteAgentState::Unknown,
            instance_address: record.instance_address.clone(),
            metrics: None,
            checked_at: Utc::now(),
        };

        if description.power_state != ComputeState::Running {
            return Ok(status);
        }

        let Some(endpoint) = record.endpoint() else {
            // Address still unresolved: degraded, not a fault.
            status.agent_state = RemoteAgentState::ApiUnreachable;
            return Ok(status);
        };

        match http::get(&endpoint, "/health", self.inner.timeouts.health).await {
            Ok(body) => {
                status.agent_state = parse_health_body(&body);
                // Metrics are best-effort garnish on a good health check.
                if let Ok(metrics_body) =
                    http::get(&endpoint, "/agent/metrics", self.inner.timeouts.metrics).await
                {
                    status.metrics = serde_json::from_str(&metrics_body).ok();
                }
            }
            Err(e) if e.is_unreachable() => {
                warn!(customer_id = %status.customer_id, error = %e, "health check unreachable");
                status.agent_state = RemoteAgentState::ApiUnreachable;
            }
            Err(e) => {
                warn!(customer_id = %status.customer_id, error = %e, "health check rejected");
                status.agent_state = RemoteAgentState::ApiError;
            }
        }

        Ok(status)
    }

    /// Push a config overlay to the tenant's node. On acceptance the overlay
    /// is deep-merged into the cached record so the registry view keeps up
    /// with what was deployed.
    pub async fn deploy_config(
        &self,
        customer_id: &str,
        config: &AgentConfig,
    ) -> Result<bool, FleetError> {
        let record = self.record(customer_id)?;
        let Some(endpoint) = record.endpoint() else {
            warn!(customer_id, "config deploy skipped: no resolved address");
            return Ok(false);
        };
        let Some(token) =
            resolve_bearer_token(&self.inner.state_dir, &record.credential_reference)
        else {
            warn!(
                customer_id,
                credential_reference = %record.credential_reference,
                "config deploy skipped: no credential resolved"
            );
            return Ok(false);
        };

        let body = serde_json::to_string(config)?;
        match http::put_authed(&endpoint, "/config", &body, &token, self.inner.timeouts.deploy)
            .await
        {
            Ok(_) => {
                self.inner.registry.record_deployed_config(customer_id, config)?;
                info!(customer_id, "config deployed");
                Ok(true)
            }
            Err(e) => {
                warn!(customer_id, error = %e, "config deploy failed");
                Ok(false)
            }
        }
    }

    /// Ask the tenant's node to restart its agent process. The call blocks
    /// until the remote supervisor reports a terminal outcome, bounded by
    /// the restart budget.
    pub async fn restart_agent(&self, customer_id: &str) -> Result<bool, FleetError> {
        let record = self.record(customer_id)?;
        let Some(endpoint) = record.endpoint() else {
            warn!(customer_id, "agent restart skipped: no resolved address");
            return Ok(false);
        };
        let Some(token) =
            resolve_bearer_token(&self.inner.state_dir, &record.credential_reference)
        else {
            warn!(customer_id, "agent restart skipped: no credential resolved");
            return Ok(false);
        };

        match http::post_authed(
            &endpoint,
            "/agent/restart",
            "{}",
            &token,
            self.inner.timeouts.restart,
        )
        .await
        {
            Ok(_) => {
                info!(customer_id, "agent restart accepted");
                Ok(true)
            }
            Err(e) => {
                warn!(customer_id, error = %e, "agent restart failed");
                Ok(false)
            }
        }
    }

    /// Trigger a power-on. Fire-and-triggered: poll `check_instance_status`
    /// to observe convergence.
    pub async fn start_instance(&self, customer_id: &str) -> Result<bool, FleetError> {
        let record = self.record(customer_id)?;
        match self.inner.compute.start_instance(&record.compute_instance_id).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(customer_id, error = %e, "instance start failed");
                Ok(false)
            }
        }
    }

    /// Trigger a power-off. Same convergence contract as `start_instance`.
    pub async fn stop_instance(&self, customer_id: &str) -> Result<bool, FleetError> {
        let record = self.record(customer_id)?;
        match self.inner.compute.stop_instance(&record.compute_instance_id).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(customer_id, error = %e, "instance stop failed");
                Ok(false)
            }
        }
    }

    /// Check every tenant concurrently, one task each, and return one row
    /// per tenant in registry enumeration order at call time.
    ///
    /// A `budget` bounds the whole batch: tenants unfinished at the deadline
    /// are abandoned as `TimedOut` while finished rows are kept.
    pub async fn bulk_status_check(&self, budget: Option<Duration>) -> Vec<TenantStatus> {
        let ids = self.inner.registry.ids();
        let deadline = budget.map(|b| tokio::time::Instant::now() + b);

        let mut handles = Vec::with_capacity(ids.len());
        for customer_id in ids {
            let controller = self.clone();
            let task_id = customer_id.clone();
            let handle =
                tokio::spawn(async move { controller.check_instance_status(&task_id).await });
            handles.push((customer_id, handle));
        }

        let mut rows = Vec::with_capacity(handles.len());
        for (customer_id, handle) in handles {
            let outcome = match join_within(deadline, handle).await {
                Some(Ok(status)) => TenantOutcome::Status(status),
                Some(Err(error)) => TenantOutcome::Failed { error },
                None => TenantOutcome::TimedOut,
            };
            if !matches!(outcome, TenantOutcome::Status(_)) {
                warn!(customer_id = %customer_id, ?outcome, "tenant status check degraded");
            }
            rows.push(TenantStatus { customer_id, outcome });
        }
        rows
    }

    /// Apply one action to each listed tenant concurrently. Unknown ids fail
    /// their own entry. Result keys follow the order of `ids`.
    pub async fn bulk_action(
        &self,
        ids: &[String],
        action: FleetAction,
        budget: Option<Duration>,
    ) -> IndexMap<String, ActionOutcome> {
        let deadline = budget.map(|b| tokio::time::Instant::now() + b);

        let mut handles = Vec::with_capacity(ids.len());
        for customer_id in ids {
            let controller = self.clone();
            let task_id = customer_id.clone();
            let handle = tokio::spawn(async move {
                match action {
                    FleetAction::Start => controller.start_instance(&task_id).await,
                    FleetAction::Stop => controller.stop_instance(&task_id).await,
                    FleetAction::Restart => controller.restart_agent(&task_id).await,
                }
            });
            handles.push((customer_id.clone(), handle));
        }

        let mut results = IndexMap::with_capacity(handles.len());
        for (customer_id, handle) in handles {
            let outcome = match join_within(deadline, handle).await {
                Some(Ok(true)) => ActionOutcome::Ok,
                Some(Ok(false)) => ActionOutcome::Failed { error: format!("{action} failed") },
                Some(Err(error)) => ActionOutcome::Failed { error },
                None => ActionOutcome::TimedOut,
            };
            results.insert(customer_id, outcome);
        }
        results
    }

    /// Fleet-wide aggregate: bulk status check plus the counting rule.
    pub async fn overview(&self, budget: Option<Duration>) -> FleetOverview {
        let rows = self.bulk_status_check(budget).await;
        FleetOverview::from_results(rows.len(), rows)
    }
}

/// `agent_status` label out of a health body; anything malformed is
/// "answered but not usefully".
fn parse_health_body(body: &str) -> RemoteAgentState {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("agent_status").and_then(|s| s.as_str().map(str::to_string)))
        .map(|label| RemoteAgentState::from_label(&label))
        .unwrap_or(RemoteAgentState::ApiError)
}

/// Await a per-tenant task, bounded by an optional absolute deadline.
/// `None` means the deadline expired; the task is aborted and abandoned.
/// Errors (including panicked tasks) come back as strings.
async fn join_within<T>(
    deadline: Option<tokio::time::Instant>,
    mut handle: JoinHandle<Result<T, FleetError>>,
) -> Option<Result<T, String>> {
    let joined = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                return None;
            }
        },
        None => handle.await,
    };
    match joined {
        Ok(Ok(value)) => Some(Ok(value)),
        Ok(Err(e)) => Some(Err(e.to_string())),
        Err(e) => Some(Err(format!("task failed: {e}"))),
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
