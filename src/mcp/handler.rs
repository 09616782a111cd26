//! JSON-RPC dispatch. One request line in, at most one response out.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::context::ToolContext;
use super::protocol::{
    methods, InitializeResult, McpError, McpRequest, McpResponse, PingResult, RequestId,
    ResourcesListResult, ResourcesReadParams, ResourcesReadResult, ServerCapabilities, ServerInfo,
    ToolsCallParams, ToolsListResult, JSONRPC_VERSION, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use super::registry::McpRegistry;

pub struct McpServer {
    registry: Arc<McpRegistry>,
    context: ToolContext,
}

impl McpServer {
    /// Builds a server with every tool and resource registered.
    pub fn new(context: ToolContext) -> Self {
        let mut registry = McpRegistry::new();
        super::tools::register_all_tools(&mut registry);
        super::resources::register_all_resources(&mut registry);

        info!(
            "MCP registry initialized with {} tools and {} resources",
            registry.tool_count(),
            registry.resource_count()
        );

        McpServer {
            registry: Arc::new(registry),
            context,
        }
    }

    /// Handles one raw line. Returns `None` for notifications.
    pub async fn handle_message(&self, text: &str) -> Option<McpResponse> {
        let raw: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                warn!("Invalid JSON: {}", e);
                return Some(McpResponse::error(None, McpError::ParseError(e.to_string())));
            }
        };

        let request: McpRequest = match serde_json::from_value(raw.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = raw
                    .get("id")
                    .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
                return Some(McpResponse::error(id, McpError::InvalidRequest(e.to_string())));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(McpResponse::error(
                request.id,
                McpError::InvalidRequest(format!("Unsupported jsonrpc version {}", request.jsonrpc)),
            ));
        }

        debug!("MCP request {}", request.method);
        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(),
            methods::INITIALIZED => return None,
            methods::PING => to_value(PingResult {}),
            methods::TOOLS_LIST => to_value(ToolsListResult {
                tools: self.registry.tools(),
            }),
            methods::TOOLS_CALL => self.handle_tools_call(&request).await,
            methods::RESOURCES_LIST => to_value(ResourcesListResult {
                resources: self.registry.resources(),
            }),
            methods::RESOURCES_READ => self.handle_resources_read(&request).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        // Notifications never get an answer, not even an error.
        let id = request.id?;
        Some(match result {
            Ok(value) => McpResponse::success(Some(id), value),
            Err(error) => {
                debug!("MCP request {} failed: {}", request.method, error);
                McpResponse::error(Some(id), error)
            }
        })
    }

    fn handle_initialize(&self) -> Result<Value, McpError> {
        to_value(InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: serde_json::json!({}),
                resources: serde_json::json!({}),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: self.context.server_version.clone(),
            },
        })
    }

    async fn handle_tools_call(&self, request: &McpRequest) -> Result<Value, McpError> {
        let params: ToolsCallParams = required_params(request)?;
        let tool = self
            .registry
            .get_tool(&params.name)
            .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", params.name)))?;

        let arguments = params.arguments.unwrap_or(serde_json::json!({}));
        let result = (tool.handler)(self.context.clone(), arguments).await?;
        to_value(result)
    }

    async fn handle_resources_read(&self, request: &McpRequest) -> Result<Value, McpError> {
        let params: ResourcesReadParams = required_params(request)?;
        let resource = self
            .registry
            .find_resource(&params.uri)
            .ok_or_else(|| McpError::ResourceNotFound(params.uri.clone()))?;

        let contents = (resource.handler)(self.context.clone(), params.uri).await?;
        to_value(ResourcesReadResult { contents })
    }
}

fn required_params<T: DeserializeOwned>(request: &McpRequest) -> Result<T, McpError> {
    request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}
