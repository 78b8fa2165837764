// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bridge_core::domain::error::{ApiPayload, PingOneError};
use bridge_core::domain::platform::{IdentityPlatform, OidcApplicationOptions};
use bridge_core::presentation::api::app;
use bytes::Bytes;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Records the risk-evaluation body and answers with a canned decision or error.
struct MockProtectPlatform {
    received: Mutex<Option<Value>>,
    failure: Option<fn() -> PingOneError>,
}

impl MockProtectPlatform {
    fn approving() -> Arc<Self> {
        Arc::new(Self {
            received: Mutex::new(None),
            failure: None,
        })
    }

    fn failing(failure: fn() -> PingOneError) -> Arc<Self> {
        Arc::new(Self {
            received: Mutex::new(None),
            failure: Some(failure),
        })
    }

    fn received(&self) -> Option<Value> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityPlatform for MockProtectPlatform {
    async fn get_protect_decision(&self, body: Value) -> Result<Value, PingOneError> {
        *self.received.lock().unwrap() = Some(body);
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok(json!({ "id": "risk-1", "result": { "level": "LOW" } })),
        }
    }

    async fn get_session(&self, _: &str) -> Result<Value, PingOneError> { unimplemented!() }
    async fn update_session(&self, _: &str, _: Value) -> Result<Value, PingOneError> { unimplemented!() }
    async fn create_oidc_service_application(&self, _: &str, _: OidcApplicationOptions) -> Result<Value, PingOneError> { unimplemented!() }
    async fn update_protect_decision(&self, _: &str, _: &str) -> Result<Value, PingOneError> { unimplemented!() }
    async fn get_authorize_decision(&self, _: &str, _: Value) -> Result<Value, PingOneError> { unimplemented!() }
    async fn pair_digital_wallet(&self, _: &str, _: &str, _: &str) -> Result<Value, PingOneError> { unimplemented!() }
    async fn get_credential_transaction(&self, _: &str, _: CancellationToken) -> Result<Value, PingOneError> { unimplemented!() }
    async fn create_mfa_device(&self, _: &str, _: Value) -> Result<Value, PingOneError> { unimplemented!() }
    async fn activate_mfa_device(&self, _: &str, _: &str, _: Value) -> Result<Value, PingOneError> { unimplemented!() }
    async fn create_mfa_device_authentication(&self, _: &str) -> Result<Value, PingOneError> { unimplemented!() }
    async fn validate_mfa_device_authentication(&self, _: &str, _: Value) -> Result<Value, PingOneError> { unimplemented!() }
    async fn upload_image(&self, _: &str, _: Bytes) -> Result<Value, PingOneError> { unimplemented!() }
    async fn get_sdk_token(&self, _: &str, _: Option<&str>) -> Result<Value, PingOneError> { unimplemented!() }
}

fn protect_request(body: Value, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/getProtectDecision")
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ip_is_taken_from_forwarded_header() {
    let platform = MockProtectPlatform::approving();
    let response = app(platform.clone())
        .oneshot(protect_request(
            json!({ "username": "alice", "sdkPayload": "signals" }),
            &[
                ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
                ("user-agent", "Mozilla/5.0"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["result"]["level"], "LOW");

    let sent = platform.received().unwrap();
    assert_eq!(sent["event"]["ip"], "203.0.113.7");
    assert_eq!(sent["event"]["user"]["name"], "alice");
    assert_eq!(sent["event"]["sdk"]["signals"]["data"], "signals");
    assert_eq!(sent["event"]["browser"]["userAgent"], "Mozilla/5.0");
}

#[tokio::test]
async fn test_explicit_ip_wins() {
    let platform = MockProtectPlatform::approving();
    let response = app(platform.clone())
        .oneshot(protect_request(
            json!({ "username": "bob", "ipAddress": "198.51.100.4", "sdkPayload": {} }),
            &[("x-forwarded-for", "203.0.113.7")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(platform.received().unwrap()["event"]["ip"], "198.51.100.4");
}

#[tokio::test]
async fn test_missing_ip_is_bad_request() {
    let platform = MockProtectPlatform::approving();
    let response = app(platform.clone())
        .oneshot(protect_request(json!({ "username": "carol", "sdkPayload": {} }), &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["error"].as_str().unwrap().contains("IP"));
    assert!(platform.received().is_none());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let response = app(MockProtectPlatform::approving())
        .oneshot(protect_request(json!({ "sdkPayload": {} }), &[("x-forwarded-for", "1.2.3.4")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_downstream_error_is_bad_gateway_with_details() {
    let platform = MockProtectPlatform::failing(|| PingOneError::Api {
        status: 400,
        body: ApiPayload::Json(json!({ "code": "INVALID_DATA" })),
    });
    let response = app(platform)
        .oneshot(protect_request(
            json!({ "username": "dave", "ipAddress": "10.0.0.1", "sdkPayload": {} }),
            &[],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["details"]["code"], "INVALID_DATA");
}

#[tokio::test]
async fn test_error_status_mapping() {
    let cases: [(fn() -> PingOneError, StatusCode); 4] = [
        (|| PingOneError::MissingConfig(vec!["ENVID".into()]), StatusCode::INTERNAL_SERVER_ERROR),
        (|| PingOneError::Network("refused".into()), StatusCode::BAD_GATEWAY),
        (|| PingOneError::Auth("bad secret".into()), StatusCode::BAD_GATEWAY),
        (
            || PingOneError::PollTimeout { attempts: 3, elapsed: Duration::from_secs(6) },
            StatusCode::GATEWAY_TIMEOUT,
        ),
    ];

    for (failure, expected) in cases {
        let response = app(MockProtectPlatform::failing(failure))
            .oneshot(protect_request(
                json!({ "username": "erin", "ipAddress": "10.0.0.1", "sdkPayload": {} }),
                &[],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn test_health() {
    let response = app(MockProtectPlatform::approving())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].is_u64());
}
