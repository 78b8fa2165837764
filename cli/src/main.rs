// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # PingOne Bridge CLI
//!
//! The `pingone-bridge` binary fronts a PingOne environment for demo apps and
//! agent hosts.
//!
//! ## Commands
//!
//! - `pingone-bridge serve` - HTTP server exposing `POST /getProtectDecision`
//! - `pingone-bridge tools` - JSON-RPC tool server over stdin/stdout
//! - `pingone-bridge config show|validate` - Configuration management
//! - `pingone-bridge token` - Acquire a worker token to check credentials
//!
//! Logs always go to stderr; stdout belongs to the tool protocol.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use pingone_bridge::commands::{self, ConfigCommand, ServeArgs};

/// PingOne bridge - identity, risk and session calls for demo apps
#[derive(Parser, Debug)]
#[command(name = "pingone-bridge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        global = true,
        env = "PINGONE_BRIDGE_LOG_LEVEL",
        default_value = "info"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Run the tool server on stdin/stdout
    #[command(name = "tools")]
    Tools,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Acquire a worker token and report its expiry
    #[command(name = "token")]
    Token,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values already in the environment win over .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle_command(args, cli.config).await,
        Some(Commands::Tools) => commands::tools::handle_command(cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Token) => commands::token::handle_command(cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_flags_and_global_config() {
        let cli = Cli::try_parse_from([
            "pingone-bridge",
            "serve",
            "--port",
            "8080",
            "-c",
            "bridge.yaml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("bridge.yaml")));
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.host, None);
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["pingone-bridge", "config", "show", "--paths"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommand::Show { paths: true }
            })
        ));

        let cli = Cli::try_parse_from(["pingone-bridge", "tools"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Tools)));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["pingone-bridge", "serve", "--port", "http"]).is_err());
    }
}
