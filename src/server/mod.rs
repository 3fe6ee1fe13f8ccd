//! Stdio tool server.
//!
//! Speaks newline-delimited JSON-RPC 2.0 (the MCP stdio transport) and
//! exposes the single [`query_vulnerabilities`](crate::tool) tool.
//!
//! Each `tools/call` runs as its own task. All output goes through one
//! writer task, so responses never interleave on the wire. Nothing other
//! than protocol messages is written to the output stream.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vulnquery::{client::OsvClient, server::ToolServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ToolServer::new(Arc::new(OsvClient::new())).serve_stdio().await
//! }
//! ```

mod protocol;

pub use protocol::{parse_request, ProtocolError, Request, Response, RpcError, JSONRPC_VERSION};

use crate::client::VulnerabilitySource;
use crate::tool::{query_vulnerabilities, tool_definition, QueryVulnerabilitiesArgs, TOOL_NAME};
use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "vulnerabilities";

/// Used when the client's `initialize` does not name a protocol version.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Clone)]
pub struct ToolServer {
    source: Arc<dyn VulnerabilitySource>,
}

impl ToolServer {
    pub fn new(source: Arc<dyn VulnerabilitySource>) -> Self {
        Self { source }
    }

    /// Serves requests from stdin until it closes.
    pub async fn serve_stdio(self) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serves requests read line by line from `reader`, writing responses
    /// to `writer`.
    ///
    /// Returns once `reader` reaches EOF and every in-flight call has been
    /// answered.
    pub async fn serve<R, W>(self, mut reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        info!(source = self.source.name(), "Tool server started");

        let (tx, rx) = mpsc::unbounded_channel::<Response>();
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let mut calls = JoinSet::new();

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    warn!(error = %e, "Rejected non-UTF-8 message");
                    let _ = tx.send(Response::failure(Value::Null, &ProtocolError::Encoding(e)));
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let request = match parse_request(line) {
                Ok(request) => request,
                Err(response) => {
                    warn!(line, "Rejected malformed message");
                    let _ = tx.send(response);
                    continue;
                }
            };

            if request.method == "tools/call" && !request.is_notification() {
                let server = self.clone();
                let tx = tx.clone();
                calls.spawn(async move {
                    if let Some(response) = server.handle_request(request).await {
                        let _ = tx.send(response);
                    }
                });
            } else if let Some(response) = self.handle_request(request).await {
                let _ = tx.send(response);
            }
        }

        while calls.join_next().await.is_some() {}
        drop(tx);
        writer_task.await??;

        info!("Tool server stopped");
        Ok(())
    }

    /// Handles one parsed message. Notifications produce no response.
    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        let Some(id) = request.id else {
            debug!(method = %request.method, "Received notification");
            return None;
        };

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => Response::success(id, result),
            Err(e) => {
                warn!(method = %request.method, error = %e, "Request failed");
                Response::failure(id, &e)
            }
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, ProtocolError> {
        match method {
            "initialize" => Ok(initialize_result(params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": [tool_definition()] })),
            "tools/call" => self.call_tool(params).await,
            other => Err(ProtocolError::MethodNotFound(other.to_string())),
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;

        if params.name != TOOL_NAME {
            return Err(ProtocolError::InvalidParams(format!(
                "Unknown tool: {}",
                params.name
            )));
        }

        let args: QueryVulnerabilitiesArgs =
            serde_json::from_value(params.arguments.unwrap_or_else(|| json!({})))
                .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;

        let text = query_vulnerabilities(self.source.as_ref(), args).await;

        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "isError": false
        }))
    }
}

fn initialize_result(params: Option<&Value>) -> Value {
    let protocol_version = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Response>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeSource;
    use crate::output::NO_RESULTS_MESSAGE;
    use tokio::io::AsyncReadExt;

    fn server(response: Option<Value>) -> ToolServer {
        ToolServer::new(Arc::new(FakeSource::new(response)))
    }

    fn request(id: i64, method: &str, params: Value) -> Request {
        Request {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(json!(id)),
            method: method.to_string(),
            params: Some(params),
        }
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let response = server(None)
            .handle_request(request(1, "initialize", json!({ "protocolVersion": "2025-03-26" })))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "vulnerabilities");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_initialize_default_protocol_version() {
        let response = server(None)
            .handle_request(request(1, "initialize", json!({})))
            .await
            .unwrap();
        assert_eq!(response.result.unwrap()["protocolVersion"], DEFAULT_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let notification = Request {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: "notifications/initialized".to_string(),
            params: None,
        };
        assert!(server(None).handle_request(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let response = server(None)
            .handle_request(request(4, "ping", json!({})))
            .await
            .unwrap();
        assert_eq!(response.id, json!(4));
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = server(None)
            .handle_request(request(2, "tools/list", json!({})))
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].clone();
        assert_eq!(tools.as_array().unwrap().len(), 1);
        assert_eq!(tools[0]["name"], TOOL_NAME);
    }

    #[tokio::test]
    async fn test_tools_call() {
        let server = server(Some(json!({ "vulns": [{ "id": "OSV-1" }] })));
        let response = server
            .handle_request(request(
                3,
                "tools/call",
                json!({
                    "name": "query_vulnerabilities",
                    "arguments": { "package_name": "left-pad", "ecosystem": "npm" }
                }),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "Vulnerability ID: OSV-1");
    }

    #[tokio::test]
    async fn test_tools_call_failed_query_is_not_an_error() {
        let response = server(None)
            .handle_request(request(
                3,
                "tools/call",
                json!({
                    "name": "query_vulnerabilities",
                    "arguments": { "package_name": "x", "ecosystem": "PyPI", "version": "1.0" }
                }),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["text"], NO_RESULTS_MESSAGE);
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let response = server(None)
            .handle_request(request(5, "tools/call", json!({ "name": "get_forecast" })))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("get_forecast"));
    }

    #[tokio::test]
    async fn test_tools_call_missing_argument() {
        let response = server(None)
            .handle_request(request(
                6,
                "tools/call",
                json!({ "name": "query_vulnerabilities", "arguments": { "ecosystem": "npm" } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = server(None)
            .handle_request(request(7, "resources/list", json!({})))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_serve_answers_invalid_utf8_and_keeps_going() {
        let mut input = b"\xff\xfe bad\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#);
        input.push(b'\n');
        let (writer, mut output) = tokio::io::duplex(64 * 1024);

        server(None).serve(input.as_slice(), writer).await.unwrap();

        let mut text = String::new();
        output.read_to_string(&mut text).await.unwrap();
        let responses: Vec<Response> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, Value::Null);
        assert_eq!(responses[0].error.as_ref().unwrap().code, -32700);
        assert_eq!(responses[1].id, json!(9));
        assert_eq!(responses[1].result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_serve_over_streams() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"query_vulnerabilities","arguments":{"package_name":"a","ecosystem":"npm"}}}"#,
            "\n",
        );
        let (writer, mut output) = tokio::io::duplex(64 * 1024);

        server(Some(json!({ "vulns": [] })))
            .serve(input.as_bytes(), writer)
            .await
            .unwrap();

        let mut text = String::new();
        output.read_to_string(&mut text).await.unwrap();

        let responses: Vec<Response> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);

        let by_id = |id: Value| responses.iter().find(|r| r.id == id).unwrap();
        assert!(by_id(json!(1)).result.is_some());
        assert_eq!(by_id(Value::Null).error.as_ref().unwrap().code, -32700);
        assert_eq!(
            by_id(json!(2)).result.as_ref().unwrap()["content"][0]["text"],
            ""
        );
    }
}
