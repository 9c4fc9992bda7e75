// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Resolve state directory: VOX_STATE_DIR > XDG_STATE_HOME/vox > ~/.local/state/vox
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("VOX_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("vox"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| anyhow!("cannot resolve state directory: HOME is not set"))?;
    Ok(PathBuf::from(home).join(".local/state/vox"))
}

/// Compute provider region (default us-east-1, `VOX_AWS_REGION` to override).
pub fn aws_region() -> String {
    std::env::var("VOX_AWS_REGION").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| {
        "us-east-1".to_string()
    })
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
