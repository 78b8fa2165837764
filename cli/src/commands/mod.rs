// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the PingOne bridge CLI

pub mod config;
pub mod serve;
pub mod token;
pub mod tools;

pub use self::config::ConfigCommand;
pub use self::serve::ServeArgs;

use anyhow::{Context, Result};
use std::path::PathBuf;

use bridge_core::domain::config::BridgeConfig;

/// Load configuration with discovery and environment overrides
pub fn load_config(config_override: Option<PathBuf>) -> Result<BridgeConfig> {
    BridgeConfig::load_or_default(config_override).context("Failed to load configuration")
}
