// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vox-core: shared domain types for the vox fleet tooling.
//!
//! Everything here is plain data: supervised-process status, customer
//! deployment records, and the fleet status model. Behavior lives in
//! `vox-supervisor` (one node) and `vox-fleet` (the controller).

pub mod customer;
pub mod fleet;
pub mod status;

pub use customer::{AgentConfig, CustomerRecord};
pub use fleet::{
    ActionOutcome, ComputeState, FleetAction, FleetOverview, FleetStatus, RemoteAgentState,
    TenantOutcome, TenantStatus,
};
pub use status::{AgentMetrics, AgentState, AgentStatus, StartOutcome, StopOutcome};
