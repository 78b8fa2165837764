// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `serve`: run the HTTP server

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use bridge_core::domain::config::{BridgeConfig, WORKER_KEYS};
use bridge_core::infrastructure::pingone::PingOneAdapter;
use bridge_core::presentation::api;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen address (overrides http.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides http.port and PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    fn apply(self, config: &mut BridgeConfig) {
        if let Some(host) = self.host {
            config.http.host = host;
        }
        if let Some(port) = self.port {
            config.http.port = port;
        }
    }
}

pub async fn handle_command(args: ServeArgs, config_override: Option<PathBuf>) -> Result<()> {
    let mut config = super::load_config(config_override)?;
    args.apply(&mut config);

    config
        .validate()
        .context("Configuration validation failed")?;

    if let Err(e) = config.require(WORKER_KEYS) {
        warn!("{}; protect decisions will fail until configured", e);
    }

    let platform = Arc::new(
        PingOneAdapter::from_config(config.clone()).context("Failed to initialize PingOne adapter")?,
    );

    info!("PingOne bridge starting");
    api::serve(&config.http, platform).await
}
