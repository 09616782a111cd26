//! Tool implementations. Domain failures are reported inside the tool result as
//! `{"success": false, "error": ...}`; only malformed calls become JSON-RPC errors.

pub mod collection;
pub mod pokemon;

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use super::protocol::{McpError, ToolsCallResult};
use super::registry::{McpRegistry, ToolResult};

pub fn register_all_tools(registry: &mut McpRegistry) {
    pokemon::register_tools(registry);
    collection::register_tools(registry);
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, McpError> {
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn json_result(value: Value) -> ToolResult {
    ToolsCallResult::json(&value).map_err(|e| McpError::InternalError(e.to_string()))
}

fn failure(error: impl ToString) -> ToolResult {
    json_result(json!({
        "success": false,
        "error": error.to_string(),
    }))
}

/// Accepts `25` as well as `"25"` or `"pikachu"`.
fn identifier<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Accepts `7` as well as `"7"`.
fn record_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(usize),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
