// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vox-fleet: orchestration of many remote agent deployments.
//!
//! The controller coordinates per-tenant compute instances and their agent
//! processes from one place, tolerating partial failure across the fleet:
//! a hung or broken tenant degrades its own row, never the batch.
//!
//! External collaborators are seams, not implementations: the compute
//! provider behind [`ComputeControl`], each tenant's management endpoint
//! behind the bearer-authed HTTP client in [`http`].

pub mod compute;
pub mod credentials;
pub mod http;

mod controller;
mod registry;

pub use compute::{AwsCliCompute, ComputeControl, ComputeError, InstanceDescription};
pub use controller::{FleetController, FleetError, FleetTimeouts};
pub use registry::{FleetRegistry, NewCustomer, RegistryError, UpdateCustomer};
