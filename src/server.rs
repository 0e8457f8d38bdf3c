//! MCP server exposing the patch engine to editors and agents.
//!
//! Model Context Protocol (2025-06-18) over stdin/stdout, one JSON-RPC 2.0
//! message per line. Each `tools/call` runs one patch to completion on the
//! calling thread; nothing is shared between calls.
//!
//! ```text
//! line ──from_slice──▶ JsonRpcRequest ──handle_request──▶ Result<Value, RpcError>
//!                                             │
//!                       "tools/call" ──▶ ToolRouter::call_tool ──▶ ToolOutput
//! ```
//!
//! Requests without an `id` are notifications and never get a reply.

use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::RpcError;
use crate::tools::{self, ToolRouter};

/// Longest accepted request line, newline included. Also bounds the size of
/// inline sources handed to `apply_patch`.
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

const PROTOCOL_VERSION: &str = "2025-06-18";
const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 response: exactly one of `result` and `error` is set.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn reply(id: Option<Value>, outcome: Result<Value, RpcError>) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(e) => {
                warn!(code = e.code(), error = %e, "request failed");
                let error = JsonRpcError {
                    code: e.code(),
                    message: e.to_string(),
                };
                (None, Some(error))
            }
        };
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
            error,
        }
    }
}

/// `tools/call` params: which tool, and its still-untyped arguments.
#[derive(Debug, Deserialize)]
struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Configuration for the MCP server.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Root that `apply_document` and `patch_file` paths are confined to.
    pub workspace: PathBuf,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
        }
    }
}

/// Run the MCP server on stdin/stdout until the client closes stdin.
///
/// # Errors
///
/// Returns an error if stdin/stdout I/O fails fatally.
pub fn run_mcp_server(config: McpServerConfig) -> Result<()> {
    info!(workspace = %config.workspace.display(), "markpatch MCP server starting");

    let router = ToolRouter::new(config.workspace);
    let mut reader = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    serve(&router, &mut reader, &mut stdout)?;

    info!("markpatch MCP server stopped");
    Ok(())
}

/// Answer newline-delimited JSON-RPC requests from `reader` on `out` until EOF.
///
/// # Errors
///
/// Returns an error on I/O failure or when a request line is longer than
/// 10 MiB.
pub fn serve(router: &ToolRouter, reader: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
    let mut buf = Vec::new();

    while read_request_line(reader, &mut buf)? {
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }
        debug!(bytes = line.len(), "received request");

        if let Some(response) = handle_line(router, line) {
            write_response(out, &response)?;
        }
    }

    info!("input closed, shutting down");
    Ok(())
}

/// Parse one request line and answer it, or return `None` for a notification.
fn handle_line(router: &ToolRouter, line: &[u8]) -> Option<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_slice(line) {
        Ok(request) => request,
        Err(e) => return Some(JsonRpcResponse::reply(None, Err(RpcError::Parse(e.to_string())))),
    };

    let id = request.id.clone();
    let outcome = handle_request(router, request);
    match id {
        Some(id) => Some(JsonRpcResponse::reply(Some(id), outcome)),
        None => {
            debug!("notification handled, no response");
            None
        }
    }
}

fn handle_request(router: &ToolRouter, request: JsonRpcRequest) -> Result<Value, RpcError> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(RpcError::InvalidRequest(format!(
            "jsonrpc version must be \"{JSONRPC_VERSION}\", got \"{}\"",
            request.jsonrpc
        )));
    }

    match request.method.as_str() {
        "initialize" => Ok(initialize_result()),
        "notifications/initialized" => {
            info!("client initialized");
            Ok(Value::Null)
        }
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tools::catalog() })),
        "tools/call" => {
            let call: ToolCall = serde_json::from_value(request.params)
                .map_err(|e| RpcError::InvalidParams(format!("tools/call: {e}")))?;
            let output = router.call_tool(&call.name, call.arguments);
            serde_json::to_value(output).map_err(|e| RpcError::Internal(e.to_string()))
        }
        other => Err(RpcError::MethodNotFound(other.to_owned())),
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn write_response(out: &mut impl Write, response: &JsonRpcResponse) -> Result<()> {
    serde_json::to_writer(&mut *out, response).context("failed to write response")?;
    out.write_all(b"\n").context("failed to write response")?;
    out.flush().context("failed to flush response")
}

/// Read the next line (newline included) into `buf`. Returns `false` at EOF.
fn read_request_line(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> Result<bool> {
    buf.clear();
    let limit = MAX_LINE_BYTES as u64 + 1;
    let read = reader
        .by_ref()
        .take(limit)
        .read_until(b'\n', buf)
        .context("failed to read request")?;

    if buf.len() > MAX_LINE_BYTES {
        bail!("request line exceeds maximum size ({MAX_LINE_BYTES} bytes)");
    }
    Ok(read > 0)
}
