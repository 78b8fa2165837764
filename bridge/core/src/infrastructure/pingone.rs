// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// PingOne Adapter
//
// Anti-Corruption Layer for the PingOne management and orchestration APIs.
// Each operation checks its configuration, builds the URL and body, and
// passes the platform's JSON back untouched.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::config::{BridgeConfig, ConfigKey, WORKER_KEYS};
use crate::domain::error::PingOneError;
use crate::domain::platform::{IdentityPlatform, OidcApplicationOptions};
use crate::infrastructure::api_client::{build_http_client, ApiClient, ApiRequest};
use crate::infrastructure::endpoints;
use crate::infrastructure::poller::{PollOptions, StatusPoller};
use crate::infrastructure::token_provider::WorkerTokenProvider;

const DEVICE_ACTIVATE_CONTENT_TYPE: &str = "application/vnd.pingidentity.device.activate+json";
const ASSERTION_CHECK_CONTENT_TYPE: &str = "application/vnd.pingidentity.assertion.check+json";
const CREDENTIAL_INITIAL_STATUS: &str = "INITIAL";

const SDK_TOKEN_KEYS: &[ConfigKey] = &[
    ConfigKey::OrchestrateApiRoot,
    ConfigKey::EnvId,
    ConfigKey::DvApiKey,
];

pub struct PingOneAdapter {
    config: Arc<BridgeConfig>,
    api: Arc<ApiClient>,
    poller: StatusPoller,
    poll_options: PollOptions,
}

impl PingOneAdapter {
    pub fn new(config: Arc<BridgeConfig>, api: Arc<ApiClient>) -> Self {
        let poll_options = PollOptions::from_settings(&config.polling);
        Self {
            poller: StatusPoller::new(api.clone()),
            config,
            api,
            poll_options,
        }
    }

    /// Wire the HTTP client, token provider and API client from configuration.
    pub fn from_config(config: BridgeConfig) -> Result<Self, PingOneError> {
        let config = Arc::new(config);
        let http = build_http_client(&config.http)?;
        let tokens = Arc::new(WorkerTokenProvider::new(http.clone(), config.clone()));
        let api = Arc::new(ApiClient::new(http, tokens));
        Ok(Self::new(config, api))
    }

    pub fn with_poll_options(mut self, options: PollOptions) -> Self {
        self.poll_options = options;
        self
    }

    fn management(&self, segments: &[&str]) -> Result<url::Url, PingOneError> {
        self.config.require(WORKER_KEYS)?;
        endpoints::management(&self.config, segments)
    }

    async fn send_json(&self, method: Method, segments: &[&str], body: Value) -> Result<Value, PingOneError> {
        let url = self.management(segments)?;
        self.api.call(method, url, Some(body), &[]).await
    }
}

fn session_cookie(session_token: &str) -> String {
    format!("ST={}", session_token)
}

#[async_trait]
impl IdentityPlatform for PingOneAdapter {
    async fn get_session(&self, session_token: &str) -> Result<Value, PingOneError> {
        let url = self.management(&["sessions", "me"])?;
        info!("Fetching session");
        let cookie = session_cookie(session_token);
        self.api.call(Method::GET, url, None, &[("Cookie", cookie.as_str())]).await
    }

    async fn update_session(&self, session_token: &str, session: Value) -> Result<Value, PingOneError> {
        let url = self.management(&["sessions", "me"])?;
        info!("Updating session");
        let cookie = session_cookie(session_token);
        self.api
            .call(Method::PUT, url, Some(session), &[("Cookie", cookie.as_str())])
            .await
    }

    async fn create_oidc_service_application(
        &self,
        display_name: &str,
        options: OidcApplicationOptions,
    ) -> Result<Value, PingOneError> {
        info!(name = display_name, "Creating OIDC service application");
        let body = options.to_request_body(display_name);
        self.send_json(Method::POST, &["applications", "oidc"], body).await
    }

    async fn get_protect_decision(&self, body: Value) -> Result<Value, PingOneError> {
        info!("Creating risk evaluation");
        self.send_json(Method::POST, &["riskEvaluations"], body).await
    }

    async fn update_protect_decision(&self, id: &str, status: &str) -> Result<Value, PingOneError> {
        info!(id, status, "Updating risk evaluation");
        self.send_json(
            Method::POST,
            &["riskEvaluations", id, "event"],
            json!({ "completionStatus": status }),
        )
        .await
    }

    async fn get_authorize_decision(&self, decision_endpoint: &str, params: Value) -> Result<Value, PingOneError> {
        info!(decision_endpoint, "Evaluating authorize decision");
        self.send_json(
            Method::POST,
            &["decisionEndpoints", decision_endpoint],
            json!({ "parameters": params }),
        )
        .await
    }

    async fn pair_digital_wallet(
        &self,
        application_instance_id: &str,
        digital_wallet_application_id: &str,
        user_id: &str,
    ) -> Result<Value, PingOneError> {
        info!(user_id, "Pairing digital wallet");
        self.send_json(
            Method::POST,
            &["users", user_id, "digitalWallets"],
            json!({
                "digitalWalletApplication": { "id": digital_wallet_application_id },
                "applicationInstance": { "id": application_instance_id }
            }),
        )
        .await
    }

    async fn get_credential_transaction(
        &self,
        transaction_id: &str,
        cancel: CancellationToken,
    ) -> Result<Value, PingOneError> {
        let url = self.management(&["presentationSessions", transaction_id])?;
        info!(transaction_id, "Waiting for credential transaction");
        self.poller
            .poll_until_status_changes(&url, CREDENTIAL_INITIAL_STATUS, &self.poll_options, &cancel)
            .await
    }

    async fn create_mfa_device(&self, user_id: &str, body: Value) -> Result<Value, PingOneError> {
        info!(user_id, "Creating MFA device");
        self.send_json(Method::POST, &["users", user_id, "devices"], body).await
    }

    async fn activate_mfa_device(&self, user_id: &str, device_id: &str, body: Value) -> Result<Value, PingOneError> {
        let url = self.management(&["users", user_id, "devices", device_id])?;
        info!(user_id, device_id, "Activating MFA device");
        self.api
            .call(
                Method::POST,
                url,
                Some(body),
                &[("Content-Type", DEVICE_ACTIVATE_CONTENT_TYPE)],
            )
            .await
    }

    async fn create_mfa_device_authentication(&self, user_id: &str) -> Result<Value, PingOneError> {
        info!(user_id, "Starting device authentication");
        self.send_json(
            Method::POST,
            &["deviceAuthentications"],
            json!({ "user": { "id": user_id } }),
        )
        .await
    }

    async fn validate_mfa_device_authentication(&self, device_auth_id: &str, body: Value) -> Result<Value, PingOneError> {
        let url = self.management(&["deviceAuthentications", device_auth_id])?;
        info!(device_auth_id, "Validating device authentication");
        self.api
            .call(
                Method::POST,
                url,
                Some(body),
                &[("Content-Type", ASSERTION_CHECK_CONTENT_TYPE)],
            )
            .await
    }

    async fn upload_image(&self, filename: &str, image: Bytes) -> Result<Value, PingOneError> {
        let url = self.management(&["images"])?;
        info!(filename, size = image.len(), "Uploading image");
        let request = ApiRequest::post(url)
            .raw("image/jpeg", image)
            .header("Content-Disposition", format!("attachment; filename={}", filename));
        Ok(self.api.execute(request).await?.into_json())
    }

    async fn get_sdk_token(&self, policy_id: &str, session_token: Option<&str>) -> Result<Value, PingOneError> {
        self.config.require(SDK_TOKEN_KEYS)?;
        let url = endpoints::orchestrate(&self.config, &["sdktoken"])?;
        let api_key = self.config.required(ConfigKey::DvApiKey)?;

        let mut body = json!({ "policyId": policy_id });
        if let Some(token) = session_token.filter(|t| !t.is_empty()) {
            body["global"] = json!({ "sessionToken": token });
        }

        info!(policy_id, "Requesting DaVinci SDK token");
        let request = ApiRequest::post(url)
            .json(body)
            .header("X-SK-API-KEY", api_key)
            .without_worker_token();
        Ok(self.api.execute(request).await?.into_json())
    }
}
