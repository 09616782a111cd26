//! JSON-RPC tool server exposing the catch workflow to LLM clients.
//!
//! - Transport: newline delimited JSON-RPC 2.0 on stdin/stdout
//! - Auth: none, tools name the acting user by email
//! - Tools: lookup, catch, collection and release operations
//! - Resources: read-only collection listings and global statistics

pub mod context;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod stdio;
pub mod tools;

pub use context::ToolContext;
pub use handler::McpServer;
pub use protocol::{McpError, McpRequest, McpResponse};
pub use stdio::run_stdio;
