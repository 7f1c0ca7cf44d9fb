//! MCP request dispatch

use serde_json::{Value, json};
use std::sync::Arc;
use stockmate_tools::{ToolError, ToolRegistry};
use tracing::{debug, error, info, warn};

use crate::jsonrpc::{JSONRPC_VERSION, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::protocol::{
    CallToolParams, Implementation, InitializeParams, InitializeResult, ListToolsResult,
    PROTOCOL_VERSION, ServerCapabilities, ToolDefinition, ToolResult, ToolsCapability,
};

/// Sent when a response cannot be encoded
const ENCODE_FAILURE: &str =
    r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#;

/// MCP server exposing the tools of a registry
///
/// Stateless apart from the read-only registry, so one instance can serve any
/// number of transports.
pub struct McpServer {
    info: Implementation,
    instructions: Option<String>,
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    /// Create a server reporting the given name and version
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            info: Implementation {
                name: name.into(),
                version: version.into(),
            },
            instructions: None,
            registry,
        }
    }

    /// Usage hint returned to clients on `initialize`
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// The registry this server dispatches to
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one raw message and return the encoded response, if any
    pub async fn handle_message(&self, message: &str) -> Option<String> {
        match serde_json::from_str::<Value>(message) {
            Ok(value) => self.handle_value(value).await.map(|response| encode(&response)),
            Err(e) => {
                warn!("Discarding malformed message: {e}");
                Some(self.parse_error_response(e.to_string()))
            }
        }
    }

    /// Encoded -32700 response for input that could not be decoded at all
    pub fn parse_error_response(&self, detail: impl Into<String>) -> String {
        encode(&JsonRpcResponse::failure(
            Value::Null,
            JsonRpcError::parse_error(detail),
        ))
    }

    /// Handle one decoded message
    ///
    /// Returns `None` for notifications.
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let id = value.get("id").cloned().unwrap_or(Value::Null);

        if !value.is_object() {
            return Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request("expected a JSON object"),
            ));
        }

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::invalid_request(e.to_string()),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request(format!(
                    "unsupported jsonrpc version '{}'",
                    request.jsonrpc
                )),
            ));
        }

        self.handle_request(request).await
    }

    /// Dispatch a well-formed request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);
        debug!(method = %request.method, "Handling request");

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                warn!(method = %request.method, code = e.code, "Request failed: {}", e.message);
                JsonRpcResponse::failure(id, e)
            }
        };

        Some(response)
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => info!("Client initialized"),
            "notifications/cancelled" => debug!("Client cancelled a request"),
            other => debug!("Ignoring notification: {other}"),
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => self.initialize(params),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(params) => serde_json::from_value(params)
                .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?,
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            info!(
                "Client connected: {} v{} (protocol {})",
                client.name,
                client.version,
                params.protocol_version.as_deref().unwrap_or("unspecified")
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.info.clone(),
            instructions: self.instructions.clone(),
        };

        to_result_value(&result)
    }

    fn list_tools(&self) -> Result<Value, JsonRpcError> {
        let tools = self
            .registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::from_tool(tool.as_ref()))
            .collect();

        to_result_value(&ListToolsResult { tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("missing params"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
            })?;

        let arguments = params.arguments.unwrap_or(Value::Null);

        let result = match self.registry.call(&params.name, arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(ToolError::UnknownTool(name)) => {
                return Err(JsonRpcError::invalid_params(format!("Unknown tool: {name}")));
            }
            Err(e) => {
                warn!(tool = %params.name, "Tool call failed: {e}");
                ToolResult::error(e.to_string())
            }
        };

        to_result_value(&result)
    }
}

fn encode(response: &JsonRpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to encode response: {e}");
        ENCODE_FAILURE.to_string()
    })
}

fn to_result_value<T: serde::Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal(e.to_string()))
}
