// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Bridge Configuration
//
// Defines the configuration schema for the PingOne bridge:
// - PingOne tenant roots and worker application credentials
// - HTTP listener and outbound request timeout
// - Status polling bounds
//
// Values come from an optional YAML file and are then overridden by the
// environment variables the platform tooling already uses (APIROOT, ENVID, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::error::PingOneError;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "PINGONE_BRIDGE_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "./pingone-bridge.yaml";

/// Keys every tool invocation needs before it may touch the network
pub const WORKER_KEYS: &[ConfigKey] = &[
    ConfigKey::ApiRoot,
    ConfigKey::AuthRoot,
    ConfigKey::EnvId,
    ConfigKey::WorkerId,
    ConfigKey::WorkerSecret,
];

/// A configuration value that may be sourced from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiRoot,
    AuthRoot,
    EnvId,
    OrchestrateApiRoot,
    WorkerId,
    WorkerSecret,
    DvApiKey,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 7] = [
        ConfigKey::ApiRoot,
        ConfigKey::AuthRoot,
        ConfigKey::EnvId,
        ConfigKey::OrchestrateApiRoot,
        ConfigKey::WorkerId,
        ConfigKey::WorkerSecret,
        ConfigKey::DvApiKey,
    ];

    /// Environment variable carrying this key
    pub fn env_name(self) -> &'static str {
        match self {
            ConfigKey::ApiRoot => "APIROOT",
            ConfigKey::AuthRoot => "AUTHROOT",
            ConfigKey::EnvId => "ENVID",
            ConfigKey::OrchestrateApiRoot => "ORCHESTRATEAPIROOT",
            ConfigKey::WorkerId => "WORKERID",
            ConfigKey::WorkerSecret => "WORKERSECRET",
            ConfigKey::DvApiKey => "DVAPIKEY",
        }
    }

    fn is_secret(self) -> bool {
        matches!(self, ConfigKey::WorkerSecret | ConfigKey::DvApiKey)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_name())
    }
}

/// Top-level bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// PingOne tenant and worker application
    #[serde(default)]
    pub pingone: PingOneSettings,

    /// HTTP listener and outbound client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Bounds for status polling
    #[serde(default)]
    pub polling: PollingSettings,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PingOneSettings {
    /// Management API root, e.g. `https://api.pingone.com/v1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_root: Option<String>,

    /// Auth root, e.g. `https://auth.pingone.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_root: Option<String>,

    /// Environment (tenant) identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_id: Option<String>,

    /// DaVinci orchestration API root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrate_api_root: Option<String>,

    /// Worker application client id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,

    /// Worker application client secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_secret: Option<String>,

    /// API key for DaVinci SDK-token issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dv_api_key: Option<String>,
}

impl fmt::Debug for PingOneSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("PingOneSettings")
            .field("api_root", &self.api_root)
            .field("auth_root", &self.auth_root)
            .field("env_id", &self.env_id)
            .field("orchestrate_api_root", &self.orchestrate_api_root)
            .field("worker_id", &self.worker_id)
            .field("worker_secret", &redact(&self.worker_secret))
            .field("dv_api_key", &redact(&self.dv_api_key))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout applied to every outbound request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Delay between attempts
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,

    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,

    /// Wall-clock bound for a single poll
    #[serde(default = "default_poll_deadline")]
    pub deadline_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            max_attempts: default_poll_attempts(),
            deadline_secs: default_poll_deadline(),
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_poll_attempts() -> u32 {
    150
}

fn default_poll_deadline() -> u64 {
    300
}

impl BridgeConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. PINGONE_BRIDGE_CONFIG environment variable
    /// 2. ./pingone-bridge.yaml (working directory)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from(DEFAULT_CONFIG_FILE);
        if cwd.exists() {
            return Some(cwd);
        }

        None
    }

    /// Load configuration with discovery, fallback to default, then apply env overrides
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            Self::from_yaml_file(path)?
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ConfigKey::ALL {
            if let Some(value) = lookup(key.env_name()).filter(|v| !v.is_empty()) {
                tracing::debug!("Environment override: {}", key);
                *self.slot_mut(key) = Some(value);
            }
        }

        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.http.port = port,
                Err(_) => tracing::warn!("Invalid value for PORT: '{}'. Ignoring.", port),
            }
        }
    }

    /// Current value of a key
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        let p = &self.pingone;
        let value = match key {
            ConfigKey::ApiRoot => &p.api_root,
            ConfigKey::AuthRoot => &p.auth_root,
            ConfigKey::EnvId => &p.env_id,
            ConfigKey::OrchestrateApiRoot => &p.orchestrate_api_root,
            ConfigKey::WorkerId => &p.worker_id,
            ConfigKey::WorkerSecret => &p.worker_secret,
            ConfigKey::DvApiKey => &p.dv_api_key,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    fn slot_mut(&mut self, key: ConfigKey) -> &mut Option<String> {
        let p = &mut self.pingone;
        match key {
            ConfigKey::ApiRoot => &mut p.api_root,
            ConfigKey::AuthRoot => &mut p.auth_root,
            ConfigKey::EnvId => &mut p.env_id,
            ConfigKey::OrchestrateApiRoot => &mut p.orchestrate_api_root,
            ConfigKey::WorkerId => &mut p.worker_id,
            ConfigKey::WorkerSecret => &mut p.worker_secret,
            ConfigKey::DvApiKey => &mut p.dv_api_key,
        }
    }

    /// Fail with every missing key at once, before any network call is made
    pub fn require(&self, keys: &[ConfigKey]) -> Result<(), PingOneError> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|key| self.get(**key).is_none())
            .map(|key| key.env_name().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PingOneError::MissingConfig(missing))
        }
    }

    /// Value of a required key
    pub fn required(&self, key: ConfigKey) -> Result<&str, PingOneError> {
        self.get(key)
            .ok_or_else(|| PingOneError::MissingConfig(vec![key.env_name().to_string()]))
    }

    /// Display value with secrets masked, for `config show`
    pub fn display_value(&self, key: ConfigKey) -> Option<String> {
        self.get(key).map(|v| {
            if key.is_secret() {
                "********".to_string()
            } else {
                v.to_string()
            }
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for key in [ConfigKey::ApiRoot, ConfigKey::AuthRoot, ConfigKey::OrchestrateApiRoot] {
            if let Some(root) = self.get(key) {
                let parsed = url::Url::parse(root)
                    .map_err(|e| anyhow::anyhow!("{} is not a valid URL ('{}'): {}", key, root, e))?;
                if parsed.cannot_be_a_base() {
                    anyhow::bail!("{} cannot be used as a base URL: '{}'", key, root);
                }
            }
        }

        if self.http.port == 0 {
            anyhow::bail!("http.port cannot be 0");
        }

        if self.http.request_timeout_secs == 0 {
            anyhow::bail!("http.request_timeout_secs must be greater than 0");
        }

        if self.polling.max_attempts == 0 {
            anyhow::bail!("polling.max_attempts must be greater than 0");
        }

        if self.polling.deadline_secs == 0 {
            anyhow::bail!("polling.deadline_secs must be greater than 0");
        }

        Ok(())
    }
}
