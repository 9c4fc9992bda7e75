// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer-token resolution for tenant management endpoints.
//!
//! Records carry an opaque `credential_reference`, never the credential
//! itself. Resolution walks a fallback chain at call time:
//!
//! ```text
//! 1. VOX_API_TOKEN_<REF> env var (ref upcased, `-` → `_`)
//! 2. <state_dir>/tokens/<ref>.token file
//! ```
//!
//! The resolved token is used for the one call and never logged.

use std::path::Path;

/// Resolve the bearer token behind a credential reference.
///
/// Returns `None` when no credential is available — callers treat that as
/// a per-tenant failure, not a fault.
pub fn resolve_bearer_token(state_dir: &Path, reference: &str) -> Option<String> {
    if let Some(token) = resolve_from_env(reference) {
        return Some(token);
    }
    resolve_from_file(state_dir, reference)
}

fn resolve_from_env(reference: &str) -> Option<String> {
    let suffix: String = reference
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    std::env::var(format!("VOX_API_TOKEN_{suffix}")).ok().filter(|t| !t.is_empty())
}

fn resolve_from_file(state_dir: &Path, reference: &str) -> Option<String> {
    // References come from operator input; refuse anything path-like.
    if reference.is_empty() || reference.contains(['/', '\\', '.']) {
        return None;
    }
    let path = state_dir.join("tokens").join(format!("{reference}.token"));
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
