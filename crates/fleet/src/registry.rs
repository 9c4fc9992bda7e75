// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable registry of customer deployment records.
//!
//! An insertion-ordered in-memory map mirrored to one JSON file, rewritten
//! wholesale (write-temp-then-rename) on every mutation. Mutations hold the
//! write lock across the save so concurrent administrative updates cannot
//! lose each other; reads never block on persistence since the hot
//! health-check path only reads.

use std::path::{Path, PathBuf};

use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::info;
use vox_core::{AgentConfig, CustomerRecord};

use crate::compute::{ComputeControl, ComputeError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("customer not found: {0}")]
    NotFound(String),
    #[error("customer already exists: {0}")]
    Duplicate(String),
    #[error("no address found for instance {0}")]
    AddressUnresolved(String),
    #[error("compute error: {0}")]
    Compute(#[from] ComputeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed registry file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input for registering a tenant. The instance address is deliberately
/// absent — it is resolved from the compute provider during `add`.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub customer_id: String,
    pub customer_name: String,
    pub compute_instance_id: String,
    pub credential_reference: String,
    pub api_port: Option<u16>,
    pub agent_config: Option<AgentConfig>,
}

/// Partial update applied to an existing record.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub customer_name: Option<String>,
    /// Deep-merged into the existing config, not replaced.
    pub agent_config: Option<AgentConfig>,
}

/// In-memory customer map mirrored to a durable JSON file.
pub struct FleetRegistry {
    path: PathBuf,
    customers: RwLock<IndexMap<String, CustomerRecord>>,
}

impl FleetRegistry {
    /// Load the registry, starting empty when no file exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let customers = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let map: IndexMap<String, CustomerRecord> = serde_json::from_str(&raw)?;
            info!(count = map.len(), "loaded customer registry");
            map
        } else {
            info!("no existing customer registry, starting empty");
            IndexMap::new()
        };
        Ok(Self { path, customers: RwLock::new(customers) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register a tenant, resolving its address from the compute provider.
    /// The record is only considered valid once an address is filled in.
    pub async fn add(
        &self,
        new: NewCustomer,
        compute: &dyn ComputeControl,
    ) -> Result<CustomerRecord, RegistryError> {
        if self.customers.read().contains_key(&new.customer_id) {
            return Err(RegistryError::Duplicate(new.customer_id));
        }

        let description = compute.describe_instance(&new.compute_instance_id).await?;
        let instance_address = description
            .reachable_address()
            .ok_or_else(|| RegistryError::AddressUnresolved(new.compute_instance_id.clone()))?
            .to_string();

        let record = CustomerRecord {
            customer_id: new.customer_id,
            customer_name: new.customer_name,
            compute_instance_id: new.compute_instance_id,
            instance_address,
            credential_reference: new.credential_reference,
            api_port: new.api_port.unwrap_or(8000),
            agent_config: new.agent_config.unwrap_or_default(),
            status: "inactive".to_string(),
            last_updated: Some(Utc::now()),
        };

        let mut customers = self.customers.write();
        // Re-check under the write lock; the describe call ran unlocked.
        if customers.contains_key(&record.customer_id) {
            return Err(RegistryError::Duplicate(record.customer_id));
        }
        customers.insert(record.customer_id.clone(), record.clone());
        self.save(&customers)?;
        info!(
            customer_id = %record.customer_id,
            instance = %record.compute_instance_id,
            "customer added"
        );
        Ok(record)
    }

    pub fn get(&self, customer_id: &str) -> Option<CustomerRecord> {
        self.customers.read().get(customer_id).cloned()
    }

    /// All records, in insertion order.
    pub fn list(&self) -> Vec<CustomerRecord> {
        self.customers.read().values().cloned().collect()
    }

    /// Customer ids in insertion order — the enumeration order bulk
    /// operations promise to preserve.
    pub fn ids(&self) -> Vec<String> {
        self.customers.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.customers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.read().is_empty()
    }

    /// Apply a partial update and persist.
    pub fn update(
        &self,
        customer_id: &str,
        update: UpdateCustomer,
    ) -> Result<CustomerRecord, RegistryError> {
        let mut customers = self.customers.write();
        let record = customers
            .get_mut(customer_id)
            .ok_or_else(|| RegistryError::NotFound(customer_id.to_string()))?;

        if let Some(name) = update.customer_name {
            record.customer_name = name;
        }
        if let Some(config) = update.agent_config {
            record.agent_config.merge(&config);
        }
        record.last_updated = Some(Utc::now());

        let record = record.clone();
        self.save(&customers)?;
        Ok(record)
    }

    pub fn remove(&self, customer_id: &str) -> Result<(), RegistryError> {
        let mut customers = self.customers.write();
        if customers.shift_remove(customer_id).is_none() {
            return Err(RegistryError::NotFound(customer_id.to_string()));
        }
        self.save(&customers)?;
        info!(customer_id, "customer removed");
        Ok(())
    }

    /// Write-through cache update after a successful remote config deploy.
    /// The remote node stays the source of truth for effect; this only
    /// keeps the display cache in step.
    pub(crate) fn record_deployed_config(
        &self,
        customer_id: &str,
        config: &AgentConfig,
    ) -> Result<(), RegistryError> {
        let mut customers = self.customers.write();
        let record = customers
            .get_mut(customer_id)
            .ok_or_else(|| RegistryError::NotFound(customer_id.to_string()))?;
        record.agent_config.merge(config);
        record.last_updated = Some(Utc::now());
        self.save(&customers)
    }

    /// Atomically rewrite the registry file. Callers hold the write lock.
    fn save(&self, customers: &IndexMap<String, CustomerRecord>) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(customers)?;
        std::fs::write(&tmp_path, json.as_bytes())?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
