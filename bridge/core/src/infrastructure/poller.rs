// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Status Poller
//!
//! Repeatedly GETs a resource until its `status` field differs from a known
//! starting value. Bounded by an attempt count and a wall-clock deadline,
//! and abandoned as soon as the caller's cancellation token fires.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Generic wait-for-transition loop over `ApiClient`
//! - **Integration:** `PingOneAdapter::get_credential_transaction` → `StatusPoller`

use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::config::PollingSettings;
use crate::domain::error::{ApiPayload, PingOneError};
use crate::infrastructure::api_client::{ApiClient, ApiRequest};

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_attempts: u32,
    pub deadline: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::from_settings(&PollingSettings::default())
    }
}

impl PollOptions {
    pub fn from_settings(settings: &PollingSettings) -> Self {
        Self {
            interval: settings.interval(),
            max_attempts: settings.max_attempts.max(1),
            deadline: settings.deadline(),
        }
    }
}

pub struct StatusPoller {
    api: Arc<ApiClient>,
}

impl StatusPoller {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Poll `url` until the body's `status` is no longer `initial_status`.
    ///
    /// Failed attempts are logged and retried unless the error is permanent.
    /// A response that is not a JSON object is a failed attempt. An object
    /// without a string `status` counts as a transition.
    pub async fn poll_until_status_changes(
        &self,
        url: &Url,
        initial_status: &str,
        options: &PollOptions,
        cancel: &CancellationToken,
    ) -> Result<Value, PingOneError> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(PingOneError::Cancelled);
            }

            attempts += 1;
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(PingOneError::Cancelled),
                result = self.api.execute(ApiRequest::new(Method::GET, url.clone())) => {
                    result.and_then(expect_object)
                }
            };

            match outcome {
                Ok(body) => {
                    let status = body.get("status").and_then(Value::as_str);
                    if status != Some(initial_status) {
                        info!(attempts, status = ?status, "Status changed");
                        return Ok(body);
                    }
                    debug!(attempts, status = initial_status, "Status unchanged");
                }
                Err(e) if e.is_permanent() => return Err(e),
                Err(e) => {
                    warn!(attempts, error = %e, "Poll attempt failed, retrying");
                }
            }

            let elapsed = started.elapsed();
            if attempts >= options.max_attempts || elapsed >= options.deadline {
                warn!(attempts, ?elapsed, "Polling gave up");
                return Err(PingOneError::PollTimeout { attempts, elapsed });
            }

            let wait = options.interval.min(options.deadline - elapsed);
            tokio::select! {
                _ = cancel.cancelled() => return Err(PingOneError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}

fn expect_object(payload: ApiPayload) -> Result<Value, PingOneError> {
    match payload {
        ApiPayload::Json(value) if value.is_object() => Ok(value),
        ApiPayload::Json(_) => Err(PingOneError::Decode("Poll response is not a JSON object".into())),
        ApiPayload::Text(_) => Err(PingOneError::Decode("Poll response is not JSON".into())),
        ApiPayload::Empty => Err(PingOneError::Decode("Poll response body is empty or unparseable".into())),
    }
}
