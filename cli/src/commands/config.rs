// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use bridge_core::domain::config::{BridgeConfig, ConfigKey, CONFIG_PATH_ENV, WORKER_KEYS};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets masked)
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = super::load_config(config_override.clone())?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./pingone-bridge.yaml");
        println!();
    }

    print!("{}", render(&config));
    Ok(())
}

/// Human-readable configuration with secrets masked
pub fn render(config: &BridgeConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n\n", "Current configuration:".bold()));

    out.push_str(&format!("{}\n", "PingOne:".bold()));
    for key in ConfigKey::ALL {
        let value = config
            .display_value(key)
            .unwrap_or_else(|| "(not set)".dimmed().to_string());
        out.push_str(&format!("  {:<20} {}\n", key.env_name(), value));
    }
    out.push('\n');

    out.push_str(&format!("{}\n", "HTTP:".bold()));
    out.push_str(&format!("  Listen: {}:{}\n", config.http.host, config.http.port));
    out.push_str(&format!("  Request timeout: {}s\n\n", config.http.request_timeout_secs));

    out.push_str(&format!("{}\n", "Polling:".bold()));
    out.push_str(&format!("  Interval: {}ms\n", config.polling.interval_ms));
    out.push_str(&format!("  Max attempts: {}\n", config.polling.max_attempts));
    out.push_str(&format!("  Deadline: {}s\n", config.polling.deadline_secs));

    out
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = super::load_config(config_path)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    if let Err(e) = config.require(WORKER_KEYS) {
        println!("{}", format!("! {}", e).yellow());
        println!("  Tool calls and worker-token requests will fail until these are set.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_masks_secrets() {
        colored::control::set_override(false);

        let mut config = BridgeConfig::default();
        config.pingone.worker_id = Some("worker".into());
        config.pingone.worker_secret = Some("hunter2".into());

        let text = render(&config);
        assert!(text.contains("WORKERID"));
        assert!(text.contains("worker"));
        assert!(text.contains("********"));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("(not set)"));
        assert!(text.contains("Listen: 0.0.0.0:3000"));
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.yaml");
        std::fs::write(&path, "pingone:\n  api_root: \"not a url\"\n").unwrap();

        assert!(validate(Some(path)).await.is_err());
    }
}
