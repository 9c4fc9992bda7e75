// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Customer deployment records.
//!
//! One [`CustomerRecord`] per tenant, keyed by `customer_id` in the fleet
//! registry. The record holds connection info only — liveness is always
//! fetched fresh from the compute API or the tenant's node, never inferred
//! from the cached `status` label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tenant-specific agent configuration overrides.
///
/// Deliberately open-ended: an opaque key→value object whose schema is owned
/// by the agent runtime, not by the controller. Updates deep-merge (nested
/// objects merge key-by-key; scalars and arrays replace), matching the
/// write-through semantics of config deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentConfig(pub Map<String, Value>);

impl AgentConfig {
    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep-merge `other` into `self`.
    pub fn merge(&mut self, other: &AgentConfig) {
        merge_objects(&mut self.0, &other.0);
    }
}

fn merge_objects(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_objects(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// One tenant's deployment: identity, compute instance, and reachability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Globally unique tenant key.
    pub customer_id: String,
    pub customer_name: String,
    /// Compute-provider instance identifier.
    pub compute_instance_id: String,
    /// Network-reachable host. Empty only transiently right after creation,
    /// until resolved from the compute provider.
    pub instance_address: String,
    /// Opaque handle for resolving this tenant's API credentials.
    /// The handle may be logged; the resolved token never is.
    pub credential_reference: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default)]
    pub agent_config: AgentConfig,
    /// Advisory display label. Never consulted for liveness decisions.
    #[serde(default = "default_status")]
    pub status: String,
    /// Timestamp of the last local mutation to this record.
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_api_port() -> u16 {
    8000
}

fn default_status() -> String {
    "inactive".to_string()
}

impl CustomerRecord {
    /// `host:port` of the tenant's management endpoint, or `None` while the
    /// address is still unresolved.
    pub fn endpoint(&self) -> Option<String> {
        if self.instance_address.is_empty() {
            None
        } else {
            Some(format!("{}:{}", self.instance_address, self.api_port))
        }
    }
}

#[cfg(test)]
#[path = "customer_tests.rs"]
mod tests;
