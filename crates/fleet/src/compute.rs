// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compute-control collaborator: the cloud provider's instance power API.
//!
//! The controller treats this as an opaque, possibly-slow, possibly-failing
//! remote dependency behind the [`ComputeControl`] trait. The shipped
//! implementation shells out to the `aws` CLI; tests script the trait
//! directly.

use async_trait::async_trait;
use thiserror::Error;
use vox_core::ComputeState;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("instance not found: {0}")]
    NotFound(String),
    #[error("compute api failure: {0}")]
    Api(String),
}

/// What a describe call reveals about one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescription {
    pub power_state: ComputeState,
    pub public_address: Option<String>,
    pub private_address: Option<String>,
}

impl InstanceDescription {
    /// Best address for reaching the instance: public, else private.
    pub fn reachable_address(&self) -> Option<&str> {
        self.public_address.as_deref().or(self.private_address.as_deref())
    }
}

/// Instance power management, abstracted per provider.
#[async_trait]
pub trait ComputeControl: Send + Sync {
    async fn describe_instance(&self, instance_id: &str)
        -> Result<InstanceDescription, ComputeError>;

    /// Trigger a power-on. Fire-and-triggered: callers poll describe to
    /// observe convergence.
    async fn start_instance(&self, instance_id: &str) -> Result<(), ComputeError>;

    /// Trigger a power-off. Same convergence contract as `start_instance`.
    async fn stop_instance(&self, instance_id: &str) -> Result<(), ComputeError>;
}

/// `ComputeControl` backed by the `aws ec2` CLI.
pub struct AwsCliCompute {
    region: String,
}

impl AwsCliCompute {
    pub fn new(region: impl Into<String>) -> Self {
        Self { region: region.into() }
    }

    async fn run_aws(&self, args: &[&str]) -> Result<String, ComputeError> {
        let output = tokio::process::Command::new("aws")
            .args(args)
            .arg("--region")
            .arg(&self.region)
            .arg("--output")
            .arg("json")
            .output()
            .await
            .map_err(|e| ComputeError::Api(format!("failed to run aws cli: {e}")))?;

        if !output.status.success() {
            return Err(ComputeError::Api(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ComputeControl for AwsCliCompute {
    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<InstanceDescription, ComputeError> {
        let raw = self
            .run_aws(&["ec2", "describe-instances", "--instance-ids", instance_id])
            .await?;
        let json: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| ComputeError::Api(format!("invalid describe response: {e}")))?;

        let instance = json
            .pointer("/Reservations/0/Instances/0")
            .ok_or_else(|| ComputeError::NotFound(instance_id.to_string()))?;

        let power_state = instance
            .pointer("/State/Name")
            .and_then(|v| v.as_str())
            .map(ComputeState::from_provider_label)
            .unwrap_or(ComputeState::Unknown);

        let address = |key: &str| {
            instance.get(key).and_then(|v| v.as_str()).map(str::to_string)
        };

        Ok(InstanceDescription {
            power_state,
            public_address: address("PublicIpAddress"),
            private_address: address("PrivateIpAddress"),
        })
    }

    async fn start_instance(&self, instance_id: &str) -> Result<(), ComputeError> {
        self.run_aws(&["ec2", "start-instances", "--instance-ids", instance_id]).await?;
        tracing::info!(instance_id, "instance start triggered");
        Ok(())
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<(), ComputeError> {
        self.run_aws(&["ec2", "stop-instances", "--instance-ids", instance_id]).await?;
        tracing::info!(instance_id, "instance stop triggered");
        Ok(())
    }
}

#[cfg(test)]
#[path = "compute_tests.rs"]
mod tests;
