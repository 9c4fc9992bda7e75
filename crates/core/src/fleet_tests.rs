// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::status::AgentMetrics;
use chrono::Utc;

fn status(id: &str, compute: ComputeState, agent: RemoteAgentState) -> TenantStatus {
    TenantStatus {
        customer_id: id.into(),
        outcome: TenantOutcome::Status(FleetStatus {
            customer_id: id.into(),
            customer_name: format!("{id} Inc"),
            compute_state: compute,
            agent_state: agent,
            instance_address: "10.0.0.1".into(),
            metrics: Some(AgentMetrics::default()),
            checked_at: Utc::now(),
        }),
    }
}

#[test]
fn provider_labels_map_onto_compute_states() {
    assert_eq!(ComputeState::from_provider_label("running"), ComputeState::Running);
    assert_eq!(ComputeState::from_provider_label("shutting-down"), ComputeState::ShuttingDown);
    assert_eq!(ComputeState::from_provider_label("rebooting??"), ComputeState::Unknown);
}

#[test]
fn failed_instance_states() {
    assert!(ComputeState::Stopped.is_failed());
    assert!(ComputeState::Stopping.is_failed());
    assert!(ComputeState::Terminated.is_failed());
    assert!(!ComputeState::Running.is_failed());
    assert!(!ComputeState::Pending.is_failed());
}

#[test]
fn agent_state_labels_round_trip() {
    for state in [
        RemoteAgentState::Running,
        RemoteAgentState::Stopped,
        RemoteAgentState::Error,
        RemoteAgentState::Unknown,
    ] {
        assert_eq!(RemoteAgentState::from_label(&state.to_string()), state);
    }
    assert_eq!(RemoteAgentState::ApiUnreachable.to_string(), "api_unreachable");
    assert_eq!(RemoteAgentState::ApiError.to_string(), "api_error");
}

#[test]
fn overview_counts_are_independent() {
    let rows = vec![
        status("a", ComputeState::Running, RemoteAgentState::Running),
        status("b", ComputeState::Running, RemoteAgentState::Stopped),
        status("c", ComputeState::Stopped, RemoteAgentState::ApiUnreachable),
    ];
    let overview = FleetOverview::from_results(3, rows);
    assert_eq!(overview.total_customers, 3);
    assert_eq!(overview.running_instances, 2);
    assert_eq!(overview.active_agents, 1);
    assert_eq!(overview.failed_instances, 1);
    assert_eq!(overview.rows.len(), 3);
}

#[test]
fn overview_keeps_a_row_for_failed_tenants() {
    let rows = vec![
        status("a", ComputeState::Running, RemoteAgentState::Running),
        TenantStatus {
            customer_id: "b".into(),
            outcome: TenantOutcome::Failed { error: "describe failed".into() },
        },
        TenantStatus { customer_id: "c".into(), outcome: TenantOutcome::TimedOut },
    ];
    let overview = FleetOverview::from_results(3, rows);
    // Failed and timed-out tenants contribute no counts but keep their row.
    assert_eq!(overview.running_instances, 1);
    assert_eq!(overview.rows.len(), 3);
    assert_eq!(overview.rows[1].customer_id, "b");
}

#[test]
fn fleet_action_parses_known_words_only() {
    assert_eq!("start".parse::<FleetAction>().unwrap(), FleetAction::Start);
    assert_eq!("stop".parse::<FleetAction>().unwrap(), FleetAction::Stop);
    assert_eq!("restart".parse::<FleetAction>().unwrap(), FleetAction::Restart);
    assert!("reboot".parse::<FleetAction>().is_err());
}
