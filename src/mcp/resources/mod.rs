//! Read-only JSON resources.

pub mod stats;

use super::registry::McpRegistry;

pub fn register_all_resources(registry: &mut McpRegistry) {
    stats::register_resources(registry);
}
