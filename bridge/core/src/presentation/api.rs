// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP API
//!
//! `POST /getProtectDecision` turns browser-collected Protect signals into a
//! risk evaluation; `GET /health` reports liveness.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::domain::config::HttpSettings;
use crate::domain::error::PingOneError;
use crate::domain::platform::{IdentityPlatform, ProtectDecisionRequest};

pub struct AppState {
    pub platform: Arc<dyn IdentityPlatform>,
    pub start_time: Instant,
}

pub fn app(platform: Arc<dyn IdentityPlatform>) -> Router {
    let state = Arc::new(AppState {
        platform,
        start_time: Instant::now(),
    });

    Router::new()
        .route("/health", get(health_handler))
        .route("/getProtectDecision", post(protect_decision_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl+C or SIGTERM.
pub async fn serve(settings: &HttpSettings, platform: Arc<dyn IdentityPlatform>) -> Result<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app(platform))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// `PingOneError` rendered as a JSON HTTP response
pub struct ApiError(pub PingOneError);

impl From<PingOneError> for ApiError {
    fn from(err: PingOneError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        let (status, body) = match self.0 {
            PingOneError::InvalidInput(_) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            PingOneError::Api { status, body } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": message, "status": status, "details": body.into_json() }),
            ),
            PingOneError::Auth(_) | PingOneError::Network(_) | PingOneError::Decode(_) => {
                (StatusCode::BAD_GATEWAY, json!({ "error": message }))
            }
            PingOneError::PollTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, json!({ "error": message })),
            PingOneError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": message })),
            PingOneError::MissingConfig(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %message, "Request failed");
        }

        (status, Json(body)).into_response()
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn protect_decision_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ProtectDecisionRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(mut request) =
        payload.map_err(|e| PingOneError::InvalidInput(e.body_text()))?;

    let ip_address = client_ip(request.ip_address.as_deref(), &headers).ok_or_else(|| {
        PingOneError::InvalidInput("Unable to determine client IP address".to_string())
    })?;

    request.user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    info!(username = %request.username, ip = %ip_address, "Requesting protect decision");

    let decision = state
        .platform
        .get_protect_decision(request.to_risk_evaluation(&ip_address))
        .await?;

    Ok(Json(decision))
}

/// Explicit `ipAddress`, else the first `x-forwarded-for` hop
fn client_ip(explicit: Option<&str>, headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = explicit.map(str::trim).filter(|ip| !ip.is_empty()) {
        return Some(ip.to_string());
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_owned)
}
