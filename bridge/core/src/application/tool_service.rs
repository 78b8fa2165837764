// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tool Service
//!
//! Catalogue and dispatcher for the PingOne tools exposed over JSON-RPC.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Validate tool arguments, check configuration, call the platform
//! - **Collaborators:**
//!   - Domain: `IdentityPlatform`, `BridgeConfig`
//!   - Presentation: `presentation::stdio` maps `ToolError` onto JSON-RPC errors
//!
//! # Flow
//!
//! 1. Resolve the tool by name
//! 2. Check the worker configuration keys (no network before this passes)
//! 3. Deserialize the typed arguments
//! 4. Call the platform and wrap the result as `{content: [{type: "json", json}]}`

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::domain::config::{BridgeConfig, WORKER_KEYS};
use crate::domain::error::PingOneError;
use crate::domain::platform::{IdentityPlatform, OidcApplicationOptions};

pub const CREATE_OIDC_SERVICE_APPLICATION: &str = "pingone.createOidcServiceApplication";
pub const GET_PROTECT_DECISION: &str = "pingone.getProtectDecision";
pub const UPDATE_PROTECT_DECISION: &str = "pingone.updateProtectDecision";
pub const GET_SESSION: &str = "pingone.getSession";
pub const UPDATE_SESSION: &str = "pingone.updateSession";

/// A tool as advertised by `tools/list`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Platform(#[from] PingOneError),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOidcArgs {
    name: String,
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    token_endpoint_auth_method: Option<String>,
    #[serde(default)]
    extra: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct ProtectDecisionArgs {
    body: Map<String, Value>,
}

#[derive(Deserialize)]
struct UpdateProtectDecisionArgs {
    id: String,
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetSessionArgs {
    session_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSessionArgs {
    session_token: String,
    session: Map<String, Value>,
}

pub struct ToolService {
    config: Arc<BridgeConfig>,
    platform: Arc<dyn IdentityPlatform>,
}

impl ToolService {
    pub fn new(config: Arc<BridgeConfig>, platform: Arc<dyn IdentityPlatform>) -> Self {
        Self { config, platform }
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Invoke a tool by name. `arguments` may be `null` for tools without
    /// required inputs.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        if !tool_definitions().iter().any(|t| t.name == name) {
            return Err(ToolError::UnknownTool(name.to_string()));
        }

        self.config.require(WORKER_KEYS)?;

        let arguments = if arguments.is_null() {
            Value::Object(Map::new())
        } else {
            arguments
        };

        info!(tool = name, "Invoking tool");

        let result = match name {
            CREATE_OIDC_SERVICE_APPLICATION => {
                let args: CreateOidcArgs = parse_args(name, arguments)?;
                let options = OidcApplicationOptions {
                    enabled: args.enabled,
                    token_endpoint_auth_method: args.token_endpoint_auth_method,
                    extra: args.extra,
                };
                self.platform
                    .create_oidc_service_application(&args.name, options)
                    .await?
            }
            GET_PROTECT_DECISION => {
                let args: ProtectDecisionArgs = parse_args(name, arguments)?;
                self.platform
                    .get_protect_decision(Value::Object(args.body))
                    .await?
            }
            UPDATE_PROTECT_DECISION => {
                let args: UpdateProtectDecisionArgs = parse_args(name, arguments)?;
                self.platform
                    .update_protect_decision(&args.id, &args.status)
                    .await?
            }
            GET_SESSION => {
                let args: GetSessionArgs = parse_args(name, arguments)?;
                self.platform.get_session(&args.session_token).await?
            }
            UPDATE_SESSION => {
                let args: UpdateSessionArgs = parse_args(name, arguments)?;
                self.platform
                    .update_session(&args.session_token, Value::Object(args.session))
                    .await?
            }
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };

        Ok(json!({ "content": [{ "type": "json", "json": result }] }))
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: CREATE_OIDC_SERVICE_APPLICATION,
            description: "Create an OIDC client_credentials (service) application",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "enabled": { "type": "boolean" },
                    "tokenEndpointAuthMethod": { "type": "string" },
                    "extra": { "type": "object" }
                },
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: GET_PROTECT_DECISION,
            description: "Create a PingOne Protect risk evaluation",
            input_schema: json!({
                "type": "object",
                "properties": { "body": { "type": "object" } },
                "required": ["body"]
            }),
        },
        ToolDefinition {
            name: UPDATE_PROTECT_DECISION,
            description: "Update a PingOne Protect risk evaluation status",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "status": { "type": "string" }
                },
                "required": ["id", "status"]
            }),
        },
        ToolDefinition {
            name: GET_SESSION,
            description: "Get current session using a session token",
            input_schema: json!({
                "type": "object",
                "properties": { "sessionToken": { "type": "string" } },
                "required": ["sessionToken"]
            }),
        },
        ToolDefinition {
            name: UPDATE_SESSION,
            description: "Update current session (PUT) using a session token",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "sessionToken": { "type": "string" },
                    "session": { "type": "object" }
                },
                "required": ["sessionToken", "session"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    /// Records the calls it receives and echoes their inputs.
    #[derive(Default)]
    struct RecordingPlatform {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingPlatform {
        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl IdentityPlatform for RecordingPlatform {
        async fn get_session(&self, session_token: &str) -> Result<Value, PingOneError> {
            self.record("get_session");
            Ok(json!({ "token": session_token }))
        }

        async fn update_session(&self, _: &str, session: Value) -> Result<Value, PingOneError> {
            self.record("update_session");
            Ok(session)
        }

        async fn create_oidc_service_application(
            &self,
            display_name: &str,
            options: OidcApplicationOptions,
        ) -> Result<Value, PingOneError> {
            self.record("create_oidc_service_application");
            Ok(options.to_request_body(display_name))
        }

        async fn get_protect_decision(&self, body: Value) -> Result<Value, PingOneError> {
            self.record("get_protect_decision");
            Ok(body)
        }

        async fn update_protect_decision(&self, id: &str, status: &str) -> Result<Value, PingOneError> {
            self.record("update_protect_decision");
            Err(PingOneError::Api {
                status: 404,
                body: crate::domain::error::ApiPayload::Json(json!({ "id": id, "status": status })),
            })
        }

        async fn get_authorize_decision(&self, _: &str, _: Value) -> Result<Value, PingOneError> {
            unimplemented!()
        }

        async fn pair_digital_wallet(&self, _: &str, _: &str, _: &str) -> Result<Value, PingOneError> {
            unimplemented!()
        }

        async fn get_credential_transaction(&self, _: &str, _: CancellationToken) -> Result<Value, PingOneError> {
            unimplemented!()
        }

        async fn create_mfa_device(&self, _: &str, _: Value) -> Result<Value, PingOneError> {
            unimplemented!()
        }

        async fn activate_mfa_device(&self, _: &str, _: &str, _: Value) -> Result<Value, PingOneError> {
            unimplemented!()
        }

        async fn create_mfa_device_authentication(&self, _: &str) -> Result<Value, PingOneError> {
            unimplemented!()
        }

        async fn validate_mfa_device_authentication(&self, _: &str, _: Value) -> Result<Value, PingOneError> {
            unimplemented!()
        }

        async fn upload_image(&self, _: &str, _: Bytes) -> Result<Value, PingOneError> {
            unimplemented!()
        }

        async fn get_sdk_token(&self, _: &str, _: Option<&str>) -> Result<Value, PingOneError> {
            unimplemented!()
        }
    }

    fn configured() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.pingone.api_root = Some("https://api.example.test/v1".into());
        config.pingone.auth_root = Some("https://auth.example.test".into());
        config.pingone.env_id = Some("env".into());
        config.pingone.worker_id = Some("id".into());
        config.pingone.worker_secret = Some("secret".into());
        config
    }

    fn service(config: BridgeConfig) -> (ToolService, Arc<RecordingPlatform>) {
        let platform = Arc::new(RecordingPlatform::default());
        (ToolService::new(Arc::new(config), platform.clone()), platform)
    }

    #[test]
    fn test_lists_five_tools() {
        let names: Vec<_> = tool_definitions().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "pingone.createOidcServiceApplication",
                "pingone.getProtectDecision",
                "pingone.updateProtectDecision",
                "pingone.getSession",
                "pingone.updateSession",
            ]
        );
        let schema = serde_json::to_value(&tool_definitions()[4]).unwrap();
        assert_eq!(schema["inputSchema"]["required"], json!(["sessionToken", "session"]));
    }

    #[tokio::test]
    async fn test_result_is_wrapped_as_json_content() {
        let (service, platform) = service(configured());
        let result = service
            .call_tool(GET_SESSION, json!({ "sessionToken": "st-1" }))
            .await
            .unwrap();

        assert_eq!(result, json!({ "content": [{ "type": "json", "json": { "token": "st-1" } }] }));
        assert_eq!(*platform.calls.lock().unwrap(), vec!["get_session"]);
    }

    #[tokio::test]
    async fn test_oidc_arguments_are_forwarded() {
        let (service, _) = service(configured());
        let result = service
            .call_tool(
                CREATE_OIDC_SERVICE_APPLICATION,
                json!({ "name": "robot", "tokenEndpointAuthMethod": "client_secret_post" }),
            )
            .await
            .unwrap();

        let body = &result["content"][0]["json"];
        assert_eq!(body["name"], "robot");
        assert_eq!(body["tokenEndpointAuthMethod"], "client_secret_post");
        assert_eq!(body["enabled"], true);
    }

    #[tokio::test]
    async fn test_missing_config_fails_before_platform_call() {
        let (service, platform) = service(BridgeConfig::default());
        let err = service
            .call_tool(GET_PROTECT_DECISION, json!({ "body": {} }))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Platform(PingOneError::MissingConfig(ref keys)) if keys.len() == 5));
        assert!(platform.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (service, _) = service(configured());
        let err = service.call_tool("pingone.nope", Value::Null).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "pingone.nope"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let (service, platform) = service(configured());

        let err = service
            .call_tool(UPDATE_SESSION, json!({ "sessionToken": "st", "session": "not-an-object" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = service.call_tool(UPDATE_PROTECT_DECISION, Value::Null).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        assert!(platform.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_platform_errors_pass_through() {
        let (service, _) = service(configured());
        let err = service
            .call_tool(UPDATE_PROTECT_DECISION, json!({ "id": "r1", "status": "SUCCESS" }))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Platform(PingOneError::Api { status: 404, .. })));
    }
}
