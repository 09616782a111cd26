//! Registration and lookup of tools and resources.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::context::ToolContext;
use super::protocol::{McpError, ResourceContent, ResourceDefinition, ToolDefinition, ToolsCallResult};

pub type ToolResult = Result<ToolsCallResult, McpError>;
pub type ResourceResult = Result<Vec<ResourceContent>, McpError>;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type ToolHandler = Arc<dyn Fn(ToolContext, Value) -> BoxFuture<ToolResult> + Send + Sync>;
pub type ResourceHandler =
    Arc<dyn Fn(ToolContext, String) -> BoxFuture<ResourceResult> + Send + Sync>;

/// A tool as advertised by `tools/list`, plus the code that runs it.
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub handler: ToolHandler,
}

pub struct RegisteredResource {
    pub definition: ResourceDefinition,
    pub handler: ResourceHandler,
}

/// Tools are kept sorted by name so `tools/list` is stable across runs.
/// Resources keep registration order.
#[derive(Default)]
pub struct McpRegistry {
    tools: BTreeMap<String, RegisteredTool>,
    resources: Vec<RegisteredResource>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tool(&mut self, tool: RegisteredTool) {
        self.tools.insert(tool.definition.name.clone(), tool);
    }

    pub fn register_resource(&mut self, resource: RegisteredResource) {
        self.resources.push(resource);
    }

    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition.clone()).collect()
    }

    pub fn get_tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn resources(&self) -> Vec<ResourceDefinition> {
        self.resources.iter().map(|r| r.definition.clone()).collect()
    }

    /// Exact match only; resource URIs carry no parameters.
    pub fn find_resource(&self, uri: &str) -> Option<&RegisteredResource> {
        self.resources.iter().find(|r| r.definition.uri == uri)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

pub struct ToolBuilder(ToolDefinition);

impl ToolBuilder {
    /// Starts a tool that takes no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        ToolBuilder(ToolDefinition {
            name: name.into(),
            description: String::new(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        })
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.description = description.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.0.input_schema = schema;
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        RegisteredTool {
            definition: self.0,
            handler: Arc::new(move |ctx, args| Box::pin(handler(ctx, args))),
        }
    }
}

pub struct ResourceBuilder(ResourceDefinition);

impl ResourceBuilder {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        ResourceBuilder(ResourceDefinition {
            uri: uri.into(),
            name: name.into(),
            description: None,
            mime_type: None,
        })
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.description = Some(description.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.0.mime_type = Some(mime_type.into());
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredResource
    where
        F: Fn(ToolContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResourceResult> + Send + 'static,
    {
        RegisteredResource {
            definition: self.0,
            handler: Arc::new(move |ctx, uri| Box::pin(handler(ctx, uri))),
        }
    }
}
