// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `token`: acquire a worker token and report its expiry

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use bridge_core::infrastructure::api_client::build_http_client;
use bridge_core::infrastructure::token_provider::WorkerTokenProvider;

pub async fn handle_command(config_override: Option<PathBuf>) -> Result<()> {
    let config = Arc::new(super::load_config(config_override)?);
    let http = build_http_client(&config.http).context("Failed to build HTTP client")?;
    let provider = WorkerTokenProvider::new(http, config);

    provider
        .acquire()
        .await
        .context("Worker token request failed")?;

    println!("{}", "✓ Worker token acquired".green());
    if let Some(expires_at) = provider.cached_expiry().await {
        println!("  {}", describe_expiry(expires_at, Utc::now().timestamp()));
    }

    Ok(())
}

fn describe_expiry(expires_at: i64, now: i64) -> String {
    let when = DateTime::<Utc>::from_timestamp(expires_at, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| expires_at.to_string());
    format!("Expires at: {} (in {}s)", when, expires_at - now)
}
