// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Identity Platform
//!
//! Domain interface for the identity platform. The HTTP router and the tool
//! service depend on this trait only; `infrastructure::pingone` implements it
//! against the PingOne REST API.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-corruption port plus the few request shapes the
//!   bridge builds itself

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use crate::domain::error::PingOneError;

/// Identity-platform operations exposed by the bridge.
///
/// Payloads are opaque JSON passed through unchanged; the bridge does not
/// interpret sessions, risk evaluations or decisions.
#[async_trait]
pub trait IdentityPlatform: Send + Sync {
    /// Session identified by an end-user session token
    async fn get_session(&self, session_token: &str) -> Result<Value, PingOneError>;

    /// Replace the session identified by `session_token`
    async fn update_session(&self, session_token: &str, session: Value) -> Result<Value, PingOneError>;

    /// Create a client_credentials OIDC application
    async fn create_oidc_service_application(
        &self,
        display_name: &str,
        options: OidcApplicationOptions,
    ) -> Result<Value, PingOneError>;

    /// Create a risk evaluation
    async fn get_protect_decision(&self, body: Value) -> Result<Value, PingOneError>;

    /// Report the completion status of a risk evaluation
    async fn update_protect_decision(&self, id: &str, status: &str) -> Result<Value, PingOneError>;

    /// Evaluate an authorize decision endpoint
    async fn get_authorize_decision(&self, decision_endpoint: &str, params: Value) -> Result<Value, PingOneError>;

    async fn pair_digital_wallet(
        &self,
        application_instance_id: &str,
        digital_wallet_application_id: &str,
        user_id: &str,
    ) -> Result<Value, PingOneError>;

    /// Wait for a presentation session to leave `INITIAL`
    async fn get_credential_transaction(
        &self,
        transaction_id: &str,
        cancel: CancellationToken,
    ) -> Result<Value, PingOneError>;

    async fn create_mfa_device(&self, user_id: &str, body: Value) -> Result<Value, PingOneError>;

    async fn activate_mfa_device(&self, user_id: &str, device_id: &str, body: Value) -> Result<Value, PingOneError>;

    async fn create_mfa_device_authentication(&self, user_id: &str) -> Result<Value, PingOneError>;

    async fn validate_mfa_device_authentication(&self, device_auth_id: &str, body: Value) -> Result<Value, PingOneError>;

    /// Upload a JPEG image
    async fn upload_image(&self, filename: &str, image: bytes::Bytes) -> Result<Value, PingOneError>;

    /// Issue a DaVinci SDK token for a flow policy
    async fn get_sdk_token(&self, policy_id: &str, session_token: Option<&str>) -> Result<Value, PingOneError>;
}

/// Optional settings for a new OIDC service application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcApplicationOptions {
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub token_endpoint_auth_method: Option<String>,

    /// Extra top-level fields merged into the request body
    #[serde(default)]
    pub extra: Option<Map<String, Value>>,
}

impl OidcApplicationOptions {
    /// Request body for `POST applications/oidc`; `extra` wins on key clashes.
    pub fn to_request_body(&self, display_name: &str) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), json!(display_name));
        body.insert("enabled".into(), json!(self.enabled.unwrap_or(true)));
        body.insert("grantTypes".into(), json!(["client_credentials"]));
        body.insert(
            "tokenEndpointAuthMethod".into(),
            json!(self
                .token_endpoint_auth_method
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or("client_secret_basic")),
        );

        if let Some(extra) = &self.extra {
            for (key, value) in extra {
                body.insert(key.clone(), value.clone());
            }
        }

        Value::Object(body)
    }
}

/// Input of the `POST /getProtectDecision` route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectDecisionRequest {
    pub username: String,

    #[serde(default)]
    pub ip_address: Option<String>,

    /// Signals collected by the Protect browser SDK
    pub sdk_payload: Value,

    #[serde(skip)]
    pub user_agent: Option<String>,
}

impl ProtectDecisionRequest {
    /// Build the `riskEvaluations` body for the given client IP.
    pub fn to_risk_evaluation(&self, ip_address: &str) -> Value {
        let mut event = json!({
            "targetResource": { "name": "PingOne Bridge" },
            "ip": ip_address,
            "sdk": { "signals": { "data": self.sdk_payload } },
            "flow": { "type": "AUTHENTICATION" },
            "user": {
                "id": self.username,
                "name": self.username,
                "type": "EXTERNAL"
            },
            "sharingType": "PRIVATE"
        });

        if let Some(user_agent) = self.user_agent.as_deref().filter(|ua| !ua.is_empty()) {
            event["browser"] = json!({ "userAgent": user_agent });
        }

        json!({ "event": event })
    }
}
