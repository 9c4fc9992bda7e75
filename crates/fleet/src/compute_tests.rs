// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn reachable_address_prefers_public() {
    let desc = InstanceDescription {
        power_state: ComputeState::Running,
        public_address: Some("54.1.2.3".into()),
        private_address: Some("10.0.1.5".into()),
    };
    assert_eq!(desc.reachable_address(), Some("54.1.2.3"));
}

#[test]
fn reachable_address_falls_back_to_private() {
    let desc = InstanceDescription {
        power_state: ComputeState::Running,
        public_address: None,
        private_address: Some("10.0.1.5".into()),
    };
    assert_eq!(desc.reachable_address(), Some("10.0.1.5"));
}

#[test]
fn unresolvable_instance_has_no_address() {
    let desc = InstanceDescription {
        power_state: ComputeState::Pending,
        public_address: None,
        private_address: None,
    };
    assert_eq!(desc.reachable_address(), None);
}
