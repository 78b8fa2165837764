// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Error
//!
//! Single result-or-error contract for every call that leaves the process.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** `PingOneError` and the parsed response body it carries

use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Parsed body of a PingOne response.
///
/// JSON when the response declared `application/json`, text otherwise.
/// `Empty` covers zero-length bodies and JSON that failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    Json(Value),
    Text(String),
    Empty,
}

impl ApiPayload {
    /// Collapse into a JSON value: text becomes a string, empty becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            ApiPayload::Json(value) => value,
            ApiPayload::Text(text) => Value::String(text),
            ApiPayload::Empty => Value::Null,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiPayload::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ApiPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiPayload::Json(value) => write!(f, "{}", value),
            ApiPayload::Text(text) => f.write_str(text),
            ApiPayload::Empty => f.write_str("<empty>"),
        }
    }
}

/// Errors that can occur while talking to the identity platform
#[derive(Debug, thiserror::Error)]
pub enum PingOneError {
    #[error("Missing required env vars: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request failed {status}: {body}")]
    Api { status: u16, body: ApiPayload },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Polling gave up after {attempts} attempts ({elapsed:?})")]
    PollTimeout { attempts: u32, elapsed: Duration },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PingOneError {
    /// Stable machine-readable name, used in tool error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            PingOneError::MissingConfig(_) => "missing_config",
            PingOneError::Auth(_) => "auth",
            PingOneError::Api { .. } => "api",
            PingOneError::Network(_) => "network",
            PingOneError::Decode(_) => "decode",
            PingOneError::PollTimeout { .. } => "poll_timeout",
            PingOneError::Cancelled => "cancelled",
            PingOneError::InvalidInput(_) => "invalid_input",
        }
    }

    /// Errors that a retry cannot fix; retry loops return these immediately.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            PingOneError::MissingConfig(_) | PingOneError::InvalidInput(_) | PingOneError::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_into_json() {
        assert_eq!(ApiPayload::Json(json!({"a": 1})).into_json(), json!({"a": 1}));
        assert_eq!(ApiPayload::Text("ok".into()).into_json(), json!("ok"));
        assert_eq!(ApiPayload::Empty.into_json(), Value::Null);
    }

    #[test]
    fn test_missing_config_message_lists_every_key() {
        let err = PingOneError::MissingConfig(vec!["APIROOT".into(), "ENVID".into()]);
        assert_eq!(err.to_string(), "Missing required env vars: APIROOT, ENVID");
        assert!(err.is_permanent());
    }

    #[test]
    fn test_api_error_carries_status_and_body() {
        let err = PingOneError::Api {
            status: 404,
            body: ApiPayload::Json(json!({"code": "NOT_FOUND"})),
        };
        assert_eq!(err.kind(), "api");
        assert_eq!(err.to_string(), r#"Request failed 404: {"code":"NOT_FOUND"}"#);
        assert!(!err.is_permanent());
    }
}
