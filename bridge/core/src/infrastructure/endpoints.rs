// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! URL construction for PingOne roots.
//!
//! Caller-supplied identifiers are pushed as path segments, so anything
//! outside the unreserved set is percent-encoded rather than spliced raw.

use url::Url;

use crate::domain::config::{BridgeConfig, ConfigKey};
use crate::domain::error::PingOneError;

/// Append `segments` to `base`, tolerating a trailing slash on the base.
///
/// Empty, `.` and `..` segments are rejected since the URL would silently
/// collapse them and address a different resource.
pub fn join(base: &str, segments: &[&str]) -> Result<Url, PingOneError> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(PingOneError::InvalidInput(format!(
            "Invalid path segment '{}'",
            bad
        )));
    }

    let mut url = Url::parse(base)
        .map_err(|e| PingOneError::InvalidInput(format!("Invalid base URL '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| PingOneError::InvalidInput(format!("URL cannot be a base: '{}'", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// `{APIROOT}/environments/{ENVID}/<segments>`
pub fn management(config: &BridgeConfig, segments: &[&str]) -> Result<Url, PingOneError> {
    let api_root = config.required(ConfigKey::ApiRoot)?;
    let env_id = config.required(ConfigKey::EnvId)?;

    let mut all = vec!["environments", env_id];
    all.extend_from_slice(segments);
    join(api_root, &all)
}

/// `{AUTHROOT}/{ENVID}/as/token`
pub fn token(config: &BridgeConfig) -> Result<Url, PingOneError> {
    let auth_root = config.required(ConfigKey::AuthRoot)?;
    let env_id = config.required(ConfigKey::EnvId)?;
    join(auth_root, &[env_id, "as", "token"])
}

/// `{ORCHESTRATEAPIROOT}/v1/company/{ENVID}/<segments>`
pub fn orchestrate(config: &BridgeConfig, segments: &[&str]) -> Result<Url, PingOneError> {
    let root = config.required(ConfigKey::OrchestrateApiRoot)?;
    let env_id = config.required(ConfigKey::EnvId)?;

    let mut all = vec!["v1", "company", env_id];
    all.extend_from_slice(segments);
    join(root, &all)
}
