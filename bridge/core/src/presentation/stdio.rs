// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Stdio Tool Server
//!
//! JSON-RPC 2.0 over `Content-Length` framed stdin/stdout. Requests are
//! handled one at a time, in arrival order; notifications get no reply.
//!
//! # Architecture
//!
//! - **Layer:** Presentation Layer
//! - **Purpose:** Map JSON-RPC methods onto `ToolService` and its errors onto
//!   JSON-RPC error objects

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::{debug, info, warn};

use crate::application::tool_service::{ToolError, ToolService};
use crate::domain::error::PingOneError;
use crate::presentation::framing::{read_frame, write_frame, FrameRead};

pub const SERVER_NAME: &str = "pingone-mcp-server";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const SERVER_ERROR: i64 = -32000;
pub const MISSING_CONFIG: i64 = -32002;

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

pub fn json_rpc_error(id: Option<Value>, code: i64, message: &str, data: Option<Value>) -> Value {
    let mut error = json!({ "code": code, "message": message });
    if let Some(data) = data {
        error["data"] = data;
    }
    json!({
        "jsonrpc": "2.0",
        "id": id.unwrap_or(Value::Null),
        "error": error
    })
}

fn json_rpc_result(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

/// JSON-RPC error for a failed tool invocation
pub fn tool_error_response(id: Value, err: &ToolError) -> Value {
    let message = err.to_string();
    match err {
        ToolError::UnknownTool(_) => json_rpc_error(Some(id), METHOD_NOT_FOUND, &message, None),
        ToolError::InvalidArguments { .. } => json_rpc_error(Some(id), INVALID_PARAMS, &message, None),
        ToolError::Platform(PingOneError::MissingConfig(missing)) => json_rpc_error(
            Some(id),
            MISSING_CONFIG,
            &message,
            Some(json!({ "missing": missing })),
        ),
        ToolError::Platform(e) => {
            let mut data = json!({ "kind": e.kind() });
            if let PingOneError::Api { status, body } = e {
                data["status"] = json!(status);
                data["body"] = body.clone().into_json();
            }
            json_rpc_error(Some(id), SERVER_ERROR, &message, Some(data))
        }
    }
}

pub struct StdioServer {
    tools: Arc<ToolService>,
}

impl StdioServer {
    pub fn new(tools: Arc<ToolService>) -> Self {
        Self { tools }
    }

    /// Serve on the process's stdin and stdout until stdin closes.
    pub async fn run_stdio(&self) -> std::io::Result<()> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut writer = tokio::io::stdout();
        self.run(&mut reader, &mut writer).await
    }

    pub async fn run<R, W>(&self, reader: &mut R, writer: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Tool server ready on stdio");

        loop {
            let response = match read_frame(reader).await? {
                FrameRead::Eof => break,
                FrameRead::MissingLength => {
                    warn!("Skipping frame without Content-Length");
                    continue;
                }
                FrameRead::TooLarge(len) => {
                    warn!(len, "Rejecting oversized frame");
                    Some(json_rpc_error(
                        None,
                        INVALID_REQUEST,
                        "Content-Length exceeds max allowed size",
                        None,
                    ))
                }
                FrameRead::Frame(body) => self.handle_frame(&body).await,
            };

            if let Some(response) = response {
                write_frame(writer, &response).await?;
            }
        }

        info!("Stdin closed, tool server stopping");
        Ok(())
    }

    /// Handle one frame body; `None` means nothing is written back.
    pub async fn handle_frame(&self, body: &[u8]) -> Option<Value> {
        let data: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                return Some(json_rpc_error(None, PARSE_ERROR, &format!("Parse error: {}", e), None));
            }
        };

        let id = data.get("id").cloned().filter(|id| !id.is_null());
        let request: JsonRpcRequest = match serde_json::from_value(data) {
            Ok(r) => r,
            Err(e) => {
                return Some(json_rpc_error(
                    id,
                    INVALID_REQUEST,
                    &format!("Invalid Request: {}", e),
                    None,
                ));
            }
        };

        let Some(id) = request.id.filter(|id| !id.is_null()) else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        Some(self.dispatch(id, &request.method, request.params).await)
    }

    async fn dispatch(&self, id: Value, method: &str, params: Option<Value>) -> Value {
        debug!(method, "Handling request");

        match method {
            "initialize" => {
                let protocol_version = params
                    .as_ref()
                    .and_then(|p| p.get("protocolVersion"))
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION)
                    .to_string();
                json_rpc_result(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {
                            "name": SERVER_NAME,
                            "version": env!("CARGO_PKG_VERSION")
                        },
                        "capabilities": { "tools": {} }
                    }),
                )
            }
            "ping" => json_rpc_result(id, json!({})),
            "tools/list" => json_rpc_result(id, json!({ "tools": self.tools.list_tools() })),
            "tools/call" => {
                let call: ToolCallParams = match params.map(serde_json::from_value::<ToolCallParams>).transpose() {
                    Ok(Some(call)) => call,
                    Ok(None) => {
                        return json_rpc_error(Some(id), INVALID_PARAMS, "Missing params", None);
                    }
                    Err(e) => {
                        return json_rpc_error(
                            Some(id),
                            INVALID_PARAMS,
                            &format!("Invalid params: {}", e),
                            None,
                        );
                    }
                };

                match self.tools.call_tool(&call.name, call.arguments).await {
                    Ok(result) => json_rpc_result(id, result),
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Tool invocation failed");
                        tool_error_response(id, &e)
                    }
                }
            }
            other => json_rpc_error(
                Some(id),
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", other),
                None,
            ),
        }
    }
}
