//! Read-only tools backed by the Pokémon lookup.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{failure, identifier, json_result, parse_params};
use crate::catch::probability;
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolResult};
use crate::pokeapi::MAX_RANDOM_POKEMON_ID;

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(search_pokemon_tool());
    registry.register_tool(get_random_pokemon_tool());
    registry.register_tool(get_pokemon_stats_tool());
}

// ============================================================================
// search_pokemon
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(deserialize_with = "identifier")]
    query: String,
}

fn search_pokemon_tool() -> RegisteredTool {
    ToolBuilder::new("search_pokemon")
        .description("Search for a Pokémon by name or ID")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Pokémon name or ID to search for"
                }
            },
            "required": ["query"]
        }))
        .build(search_pokemon_handler)
}

async fn search_pokemon_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: SearchParams = parse_params(params)?;
    match ctx.catch_workflow.lookup(&params.query).await {
        Ok(pokemon) => json_result(json!({ "success": true, "pokemon": pokemon })),
        Err(e) => failure(e),
    }
}

// ============================================================================
// get_random_pokemon
// ============================================================================

#[derive(Debug, Deserialize)]
struct RandomParams {
    #[serde(default = "default_max_id")]
    max_id: u32,
}

fn default_max_id() -> u32 {
    MAX_RANDOM_POKEMON_ID
}

fn get_random_pokemon_tool() -> RegisteredTool {
    ToolBuilder::new("get_random_pokemon")
        .description("Get a random Pokémon from the PokéAPI")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "max_id": {
                    "type": "integer",
                    "description": format!("Maximum Pokémon ID to include (default: {})", MAX_RANDOM_POKEMON_ID),
                    "default": MAX_RANDOM_POKEMON_ID
                }
            }
        }))
        .build(get_random_pokemon_handler)
}

async fn get_random_pokemon_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: RandomParams = parse_params(params)?;
    match ctx.catch_workflow.random_pokemon_up_to(params.max_id).await {
        Ok(pokemon) => {
            let random_id = pokemon.poke_id;
            json_result(json!({
                "success": true,
                "pokemon": pokemon,
                "random_id": random_id,
            }))
        }
        Err(e) => failure(e),
    }
}

// ============================================================================
// get_pokemon_stats
// ============================================================================

#[derive(Debug, Deserialize)]
struct StatsParams {
    #[serde(deserialize_with = "identifier")]
    pokemon_id: String,
}

fn get_pokemon_stats_tool() -> RegisteredTool {
    ToolBuilder::new("get_pokemon_stats")
        .description("Get detailed statistics for a specific Pokémon")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "pokemon_id": {
                    "type": "string",
                    "description": "ID or name of the Pokémon"
                }
            },
            "required": ["pokemon_id"]
        }))
        .build(get_pokemon_stats_handler)
}

async fn get_pokemon_stats_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: StatsParams = parse_params(params)?;
    let pokemon = match ctx.catch_workflow.lookup(&params.pokemon_id).await {
        Ok(pokemon) => pokemon,
        Err(e) => return failure(e),
    };
    let times_caught = match ctx.collection_manager.times_caught(pokemon.poke_id) {
        Ok(count) => count,
        Err(e) => return failure(e),
    };
    debug!("{} was caught {} times", pokemon.name, times_caught);

    let catch_difficulty = probability(pokemon.base_experience);
    json_result(json!({
        "success": true,
        "pokemon": pokemon,
        "database_stats": {
            "times_caught": times_caught,
            "catch_difficulty": catch_difficulty,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::test_support::{tool_json, TestContext};

    #[tokio::test]
    async fn search_returns_the_record() {
        let test = TestContext::new();
        let result = tool_json(search_pokemon_handler(test.ctx(), json!({"query": "Pikachu"})).await);
        assert_eq!(result["success"], true);
        assert_eq!(result["pokemon"]["name"], "pikachu");
        assert_eq!(result["pokemon"]["poke_id"], 25);
    }

    #[tokio::test]
    async fn search_failure_is_reported_in_content() {
        let test = TestContext::new();
        let result = tool_json(search_pokemon_handler(test.ctx(), json!({"query": "missingno"})).await);
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("missingno"));
    }

    #[tokio::test]
    async fn random_respects_max_id() {
        let test = TestContext::new();
        let result = tool_json(get_random_pokemon_handler(test.ctx(), json!({"max_id": 1})).await);
        assert_eq!(result["success"], true);
        assert_eq!(result["random_id"], 1);
        assert_eq!(result["pokemon"]["name"], "bulbasaur");
    }

    #[tokio::test]
    async fn stats_count_catches_across_users() {
        let test = TestContext::new();
        test.give("ash@example.com", "pikachu");
        test.give("misty@example.com", "pikachu");

        let result = tool_json(get_pokemon_stats_handler(test.ctx(), json!({"pokemon_id": 25})).await);
        assert_eq!(result["success"], true);
        assert_eq!(result["database_stats"]["times_caught"], 2);
        let difficulty = result["database_stats"]["catch_difficulty"].as_f64().unwrap();
        assert!((difficulty - probability(112)).abs() < 1e-9);
    }
}
