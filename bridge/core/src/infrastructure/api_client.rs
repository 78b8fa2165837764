// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Authenticated API Client
//
// Sends one request to PingOne with the worker bearer token attached and
// turns the response into an `ApiPayload`. Every non-2xx status becomes
// `PingOneError::Api` carrying the parsed body, so callers see the
// platform's own error document.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::domain::config::HttpSettings;
use crate::domain::error::{ApiPayload, PingOneError};
use crate::domain::token::TokenSource;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Shared outbound client with the configured timeout
pub fn build_http_client(settings: &HttpSettings) -> Result<Client, PingOneError> {
    Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .user_agent(concat!("pingone-bridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PingOneError::Network(format!("Failed to build HTTP client: {}", e)))
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    None,
    Json(Value),
    Raw { content_type: String, bytes: Bytes },
}

/// A single outbound call, assembled before it is handed to `ApiClient::execute`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    body: RequestBody,
    headers: Vec<(String, String)>,
    bearer: bool,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: RequestBody::None,
            headers: Vec::new(),
            bearer: true,
        }
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Send `bytes` verbatim with the given content type
    pub fn raw(mut self, content_type: impl Into<String>, bytes: Bytes) -> Self {
        self.body = RequestBody::Raw {
            content_type: content_type.into(),
            bytes,
        };
        self
    }

    /// Extra header; replaces a default of the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Skip the worker token, for endpoints authenticated some other way
    pub fn without_worker_token(mut self) -> Self {
        self.bearer = false;
        self
    }
}

pub struct ApiClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(http: Client, tokens: Arc<dyn TokenSource>) -> Self {
        Self { http, tokens }
    }

    /// Authenticated call with an optional JSON body and extra headers.
    ///
    /// Returns the parsed body: JSON when the response is JSON, a string for
    /// text, `null` when there is nothing to parse.
    pub async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Result<Value, PingOneError> {
        let mut request = ApiRequest::new(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        Ok(self.execute(request).await?.into_json())
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<ApiPayload, PingOneError> {
        let ApiRequest {
            method,
            url,
            body,
            headers: extra,
            bearer,
        } = request;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

        if bearer {
            let token = self.tokens.access_token().await?;
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
        }

        let payload = match body {
            RequestBody::None => None,
            RequestBody::Json(value) => Some(Bytes::from(
                serde_json::to_vec(&value).map_err(|e| PingOneError::InvalidInput(e.to_string()))?,
            )),
            RequestBody::Raw { content_type, bytes } => {
                headers.insert(CONTENT_TYPE, header_value(&content_type)?);
                Some(bytes)
            }
        };

        for (name, value) in &extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| PingOneError::InvalidInput(format!("Invalid header name '{}': {}", name, e)))?;
            headers.insert(name, header_value(value)?);
        }

        info!(method = %method, url = %url, "Calling PingOne");

        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }

        let response = builder.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let payload = parse_payload(content_type.as_deref(), &bytes);

        if !status.is_success() {
            debug!(status = status.as_u16(), "PingOne returned an error status");
            if bearer && status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }
            return Err(PingOneError::Api {
                status: status.as_u16(),
                body: payload,
            });
        }

        Ok(payload)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, PingOneError> {
    HeaderValue::from_str(value)
        .map_err(|e| PingOneError::InvalidInput(format!("Invalid header value: {}", e)))
}

fn map_transport_error(err: reqwest::Error) -> PingOneError {
    if err.is_decode() {
        PingOneError::Decode(err.to_string())
    } else {
        PingOneError::Network(err.to_string())
    }
}

/// `application/json` and any `+json` structured suffix
fn is_json_mime(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

fn parse_payload(content_type: Option<&str>, bytes: &[u8]) -> ApiPayload {
    if bytes.is_empty() {
        return ApiPayload::Empty;
    }

    if content_type.map(is_json_mime).unwrap_or(false) {
        return match serde_json::from_slice(bytes) {
            Ok(value) => ApiPayload::Json(value),
            Err(_) => ApiPayload::Empty,
        };
    }

    ApiPayload::Text(String::from_utf8_lossy(bytes).into_owned())
}
