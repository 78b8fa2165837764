// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Worker Token
//!
//! Model of the OAuth client-credentials access token the bridge uses to call
//! PingOne on its own behalf, and the expiry arithmetic around it.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Token value object and grant response parsing

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::error::PingOneError;

/// A cached token is treated as expired this many seconds early.
pub const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the grant response omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Access token plus its absolute expiry (unix seconds)
#[derive(Clone, PartialEq, Eq)]
pub struct WorkerToken {
    pub access_token: String,
    pub expires_at: i64,
}

impl WorkerToken {
    /// Usable at `now` only while `expires_at - 60 > now`.
    pub fn is_usable_at(&self, now: i64) -> bool {
        self.expires_at.saturating_sub(TOKEN_EXPIRY_SKEW_SECS) > now
    }
}

impl std::fmt::Debug for WorkerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerToken")
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer tokens for authenticated calls
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A token usable right now, refreshing it first if needed
    async fn access_token(&self) -> Result<String, PingOneError>;

    /// Forget any cached token after the platform rejected it
    async fn invalidate(&self) {}
}

/// Body of a `as/token` client-credentials response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,

    /// Non-numeric values are treated as absent
    #[serde(default, deserialize_with = "lenient_i64")]
    pub expires_in: Option<i64>,

    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Turn the grant response into a token issued at `now`.
    pub fn into_token(self, now: i64) -> Result<WorkerToken, PingOneError> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PingOneError::Auth("Worker token response missing access_token".into()))?;

        let lifetime = self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        Ok(WorkerToken {
            access_token,
            expires_at: now.saturating_add(lifetime),
        })
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))))
}
