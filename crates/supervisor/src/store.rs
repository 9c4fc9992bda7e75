// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable status record for the supervised process.
//!
//! One JSON file per node, owned exclusively by the single supervisor
//! running there — no cross-process locking. Every save rewrites the whole
//! record atomically (write temp, then rename) so a concurrent reader never
//! observes a half-written record.

use std::path::{Path, PathBuf};

use thiserror::Error;
use vox_core::AgentStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed status record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and rewrites the node's `agent_status.json`.
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted status. A missing file is not an error — it means
    /// no supervisor has run here yet, which is a default stopped record.
    pub fn load(&self) -> Result<AgentStatus, StoreError> {
        if !self.path.exists() {
            return Ok(AgentStatus::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Atomically replace the status record.
    pub fn save(&self, status: &AgentStatus) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(status)?;
        std::fs::write(&tmp_path, json.as_bytes())?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
