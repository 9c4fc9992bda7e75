// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::compute::InstanceDescription;
use async_trait::async_trait;
use serde_json::json;
use vox_core::ComputeState;

struct StubCompute {
    address: Option<String>,
}

#[async_trait]
impl ComputeControl for StubCompute {
    async fn describe_instance(
        &self,
        _instance_id: &str,
    ) -> Result<InstanceDescription, ComputeError> {
        Ok(InstanceDescription {
            power_state: ComputeState::Running,
            public_address: self.address.clone(),
            private_address: None,
        })
    }

    async fn start_instance(&self, _instance_id: &str) -> Result<(), ComputeError> {
        Ok(())
    }

    async fn stop_instance(&self, _instance_id: &str) -> Result<(), ComputeError> {
        Ok(())
    }
}

fn new_customer(id: &str) -> NewCustomer {
    NewCustomer {
        customer_id: id.to_string(),
        customer_name: format!("{id} Inc"),
        compute_instance_id: format!("i-{id}"),
        credential_reference: format!("{id}-token"),
        api_port: None,
        agent_config: None,
    }
}

fn stub() -> StubCompute {
    StubCompute { address: Some("198.51.100.7".to_string()) }
}

#[tokio::test]
async fn add_resolves_address_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.json");
    let registry = FleetRegistry::open(&path).unwrap();

    let record = registry.add(new_customer("acme"), &stub()).await.unwrap();
    assert_eq!(record.instance_address, "198.51.100.7");
    assert_eq!(record.api_port, 8000);
    assert_eq!(record.status, "inactive");

    // A fresh open sees the same record.
    let reloaded = FleetRegistry::open(&path).unwrap();
    assert_eq!(reloaded.get("acme").unwrap().customer_name, "acme Inc");
}

#[tokio::test]
async fn duplicate_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FleetRegistry::open(dir.path().join("customers.json")).unwrap();

    registry.add(new_customer("acme"), &stub()).await.unwrap();
    let err = registry.add(new_customer("acme"), &stub()).await.unwrap_err();
    assert!(matches!(err, RegistryError::Duplicate(id) if id == "acme"));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn unresolvable_address_is_rejected_and_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FleetRegistry::open(dir.path().join("customers.json")).unwrap();

    let compute = StubCompute { address: None };
    let err = registry.add(new_customer("acme"), &compute).await.unwrap_err();
    assert!(matches!(err, RegistryError::AddressUnresolved(_)));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn ids_keep_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.json");
    let registry = FleetRegistry::open(&path).unwrap();

    for id in ["zeta", "alpha", "mid"] {
        registry.add(new_customer(id), &stub()).await.unwrap();
    }
    assert_eq!(registry.ids(), vec!["zeta", "alpha", "mid"]);

    // Order survives the round trip through the file.
    let reloaded = FleetRegistry::open(&path).unwrap();
    assert_eq!(reloaded.ids(), vec!["zeta", "alpha", "mid"]);
}

#[tokio::test]
async fn update_merges_config_and_bumps_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FleetRegistry::open(dir.path().join("customers.json")).unwrap();

    let mut new = new_customer("acme");
    new.agent_config =
        Some(AgentConfig::from_value(json!({"voice": {"speed": 1.0, "pitch": 2}})).unwrap());
    let before = registry.add(new, &stub()).await.unwrap();

    let update = UpdateCustomer {
        customer_name: Some("Acme Corp".to_string()),
        agent_config: Some(AgentConfig::from_value(json!({"voice": {"speed": 1.5}})).unwrap()),
    };
    let after = registry.update("acme", update).unwrap();

    assert_eq!(after.customer_name, "Acme Corp");
    let voice = after.agent_config.0.get("voice").unwrap();
    assert_eq!(voice["speed"], json!(1.5));
    assert_eq!(voice["pitch"], json!(2));
    assert!(after.last_updated >= before.last_updated);
}

#[tokio::test]
async fn update_unknown_customer_fails() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FleetRegistry::open(dir.path().join("customers.json")).unwrap();
    let err = registry.update("ghost", UpdateCustomer::default()).unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(id) if id == "ghost"));
}

#[tokio::test]
async fn remove_deletes_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.json");
    let registry = FleetRegistry::open(&path).unwrap();

    registry.add(new_customer("acme"), &stub()).await.unwrap();
    registry.add(new_customer("bobs"), &stub()).await.unwrap();
    registry.remove("acme").unwrap();

    assert!(registry.get("acme").is_none());
    let reloaded = FleetRegistry::open(&path).unwrap();
    assert_eq!(reloaded.ids(), vec!["bobs"]);
}

#[tokio::test]
async fn remove_unknown_customer_fails() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FleetRegistry::open(dir.path().join("customers.json")).unwrap();
    assert!(matches!(registry.remove("ghost"), Err(RegistryError::NotFound(_))));
}

#[test]
fn corrupt_registry_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(FleetRegistry::open(&path), Err(RegistryError::Json(_))));
}
