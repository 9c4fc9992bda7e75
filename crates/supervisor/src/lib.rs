// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vox-supervisor: lifecycle supervision of one local agent process.
//!
//! One supervisor instance owns one agent process on one node: it starts and
//! stops it, verifies liveness against the real OS process table, collects
//! resource metrics, and keeps a durable status record that survives
//! supervisor restarts.
//!
//! Operational failures (spawn errors, signal errors, store I/O) are
//! absorbed here and surfaced as structured outcomes — callers never see a
//! raised fault for a problem the supervisor can describe in its status.

mod process;
mod store;
mod supervisor;

pub use process::{ProcessControl, ProcessError, ProcessStats, SignalKind, UnixProcessControl};
pub use store::{StatusStore, StoreError};
pub use supervisor::{Supervisor, SupervisorConfig};
