use serde_json::json;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ResourceContent};
use crate::mcp::registry::{McpRegistry, RegisteredResource, ResourceBuilder, ResourceResult};
use crate::mcp::tools::collection::CollectionEntry;

pub const COLLECTIONS_URI: &str = "pokemon://collections";
pub const GLOBAL_STATS_URI: &str = "pokemon://stats/global";

pub fn register_resources(registry: &mut McpRegistry) {
    registry.register_resource(collections_resource());
    registry.register_resource(global_stats_resource());
}

fn internal(e: impl ToString) -> McpError {
    McpError::InternalError(e.to_string())
}

// ============================================================================
// pokemon://collections
// ============================================================================

fn collections_resource() -> RegisteredResource {
    ResourceBuilder::new(COLLECTIONS_URI, "All User Collections")
        .description("List of all users and their Pokémon collections")
        .mime_type("application/json")
        .build(collections_handler)
}

async fn collections_handler(ctx: ToolContext, uri: String) -> ResourceResult {
    let all = ctx.collection_manager.all_collections().map_err(internal)?;
    let collections: Vec<_> = all
        .iter()
        .filter(|c| !c.pokemon.is_empty())
        .map(|c| {
            json!({
                "user_email": c.email,
                "pokemon_count": c.pokemon.len(),
                "collection": c.pokemon.iter().map(CollectionEntry::from).collect::<Vec<_>>(),
            })
        })
        .collect();

    let output = json!({
        "total_users": collections.len(),
        "collections": collections,
    });
    Ok(vec![ResourceContent::json(uri, &output).map_err(internal)?])
}

// ============================================================================
// pokemon://stats/global
// ============================================================================

fn global_stats_resource() -> RegisteredResource {
    ResourceBuilder::new(GLOBAL_STATS_URI, "Global Statistics")
        .description("Global Pokémon catching statistics")
        .mime_type("application/json")
        .build(global_stats_handler)
}

async fn global_stats_handler(ctx: ToolContext, uri: String) -> ResourceResult {
    let stats = ctx.collection_manager.stats().map_err(internal)?;
    let output = json!({
        "total_pokemon_caught": stats.total_pokemon_caught,
        "total_users": stats.total_users,
        "active_users": stats.active_users,
        "most_caught_pokemon": stats.most_caught_pokemon,
        "average_pokemon_per_user": stats.average_pokemon_per_user(),
    });
    Ok(vec![ResourceContent::json(uri, &output).map_err(internal)?])
}
