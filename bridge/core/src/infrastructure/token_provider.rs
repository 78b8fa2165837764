// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Worker Token Provider
//!
//! Obtains an access token for the PingOne worker application with the
//! client-credentials grant and caches it until shortly before expiry.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Owns the single-slot token cache
//! - **Integration:** `ApiClient` → `WorkerTokenProvider` → `{AUTHROOT}/{ENVID}/as/token`
//!
//! The cache mutex is held across the whole check-then-refresh sequence, so
//! concurrent callers that find the slot stale wait on one grant and then
//! share its result instead of each issuing their own.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::config::{BridgeConfig, ConfigKey};
use crate::domain::error::PingOneError;
use crate::domain::token::{TokenResponse, TokenSource, WorkerToken};
use crate::infrastructure::endpoints;

const TOKEN_KEYS: &[ConfigKey] = &[
    ConfigKey::AuthRoot,
    ConfigKey::EnvId,
    ConfigKey::WorkerId,
    ConfigKey::WorkerSecret,
];

pub struct WorkerTokenProvider {
    client: Client,
    config: Arc<BridgeConfig>,
    cache: Mutex<Option<WorkerToken>>,
}

impl WorkerTokenProvider {
    pub fn new(client: Client, config: Arc<BridgeConfig>) -> Self {
        Self {
            client,
            config,
            cache: Mutex::new(None),
        }
    }

    /// Return the cached token, or run a grant when the slot is empty or
    /// within the expiry margin.
    pub async fn acquire(&self) -> Result<String, PingOneError> {
        let mut slot = self.cache.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = slot.as_ref().filter(|t| t.is_usable_at(now)) {
            debug!(expires_at = token.expires_at, "Using cached worker token");
            return Ok(token.access_token.clone());
        }

        let token = self.request_token(now).await?;
        info!(expires_at = token.expires_at, "Worker token refreshed");

        let access_token = token.access_token.clone();
        *slot = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token; the next `acquire` performs a grant.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Expiry of the cached token, if any
    pub async fn cached_expiry(&self) -> Option<i64> {
        self.cache.lock().await.as_ref().map(|t| t.expires_at)
    }

    async fn request_token(&self, now: i64) -> Result<WorkerToken, PingOneError> {
        self.config.require(TOKEN_KEYS)?;
        let url = endpoints::token(&self.config)?;
        let client_id = self.config.required(ConfigKey::WorkerId)?;
        let client_secret = self.config.required(ConfigKey::WorkerSecret)?;

        debug!(url = %url, "Requesting worker token");

        let response = self
            .client
            .post(url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PingOneError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Worker token request failed");
            return Err(PingOneError::Auth(format!(
                "Worker token request failed: {} {}",
                status, text
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| PingOneError::Auth(format!("Invalid worker token response: {}", e)))?;

        body.into_token(now)
    }
}

#[async_trait]
impl TokenSource for WorkerTokenProvider {
    async fn access_token(&self) -> Result<String, PingOneError> {
        self.acquire().await
    }

    async fn invalidate(&self) {
        WorkerTokenProvider::invalidate(self).await
    }
}
