// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `tools`: run the JSON-RPC tool server on stdin/stdout

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use bridge_core::application::tool_service::ToolService;
use bridge_core::infrastructure::pingone::PingOneAdapter;
use bridge_core::presentation::stdio::StdioServer;

pub async fn handle_command(config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    let platform = Arc::new(
        PingOneAdapter::from_config(config.clone()).context("Failed to initialize PingOne adapter")?,
    );
    let tools = Arc::new(ToolService::new(Arc::new(config), platform));

    info!("PingOne tool server starting");
    StdioServer::new(tools)
        .run_stdio()
        .await
        .context("Tool server I/O failed")
}
