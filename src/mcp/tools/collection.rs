//! Tools acting on a user's collection. The user is named by `user_email`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{failure, identifier, json_result, parse_params, record_id};
use crate::catch::CatchResult;
use crate::collection::{CaughtPokemon, COLLECTION_LIMIT};
use crate::errors::PokeError;
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolResult};
use crate::messages::{capitalize, caught_message, fled_message};

const USER_NOT_FOUND: &str = "User not found";

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(attempt_catch_pokemon_tool());
    registry.register_tool(get_user_collection_tool());
    registry.register_tool(release_pokemon_tool());
}

/// Collection entry as exposed to tool clients.
#[derive(Debug, Serialize)]
pub struct CollectionEntry<'a> {
    pub id: usize,
    pub poke_id: u32,
    pub name: &'a str,
    pub base_experience: u32,
    pub sprite_url: Option<&'a str>,
    pub caught_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> From<&'a CaughtPokemon> for CollectionEntry<'a> {
    fn from(p: &'a CaughtPokemon) -> Self {
        CollectionEntry {
            id: p.id,
            poke_id: p.poke_id,
            name: &p.name,
            base_experience: p.base_experience,
            sprite_url: p.sprite_url.as_deref(),
            caught_at: p.caught_at,
        }
    }
}

// ============================================================================
// attempt_catch_pokemon
// ============================================================================

#[derive(Debug, Deserialize)]
struct CatchParams {
    #[serde(deserialize_with = "identifier")]
    pokemon_id: String,
    user_email: String,
}

fn attempt_catch_pokemon_tool() -> RegisteredTool {
    ToolBuilder::new("attempt_catch_pokemon")
        .description("Attempt to catch a Pokémon with probability-based success")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "pokemon_id": {
                    "type": "string",
                    "description": "ID or name of the Pokémon to catch"
                },
                "user_email": {
                    "type": "string",
                    "description": "Email of the user attempting to catch"
                }
            },
            "required": ["pokemon_id", "user_email"]
        }))
        .build(attempt_catch_pokemon_handler)
}

async fn attempt_catch_pokemon_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CatchParams = parse_params(params)?;
    let Some(user) = ctx.find_user(&params.user_email)? else {
        return failure(USER_NOT_FOUND);
    };

    match ctx.catch_workflow.attempt_catch(user.id, &params.pokemon_id).await {
        Ok(CatchResult::Caught {
            pokemon,
            record,
            count,
        }) => {
            info!("{} caught {} through a tool call", user.email, pokemon.name);
            json_result(json!({
                "success": true,
                "message": caught_message(&pokemon.name),
                "pokemon": pokemon,
                "pokemon_count": count,
                "caught_pokemon_id": record.id,
            }))
        }
        Ok(CatchResult::Fled { pokemon }) => json_result(json!({
            "success": false,
            "message": fled_message(&pokemon.name),
            "pokemon": pokemon,
        })),
        Ok(CatchResult::LimitReached { limit }) => json_result(json!({
            "success": false,
            "error": format!("User already has {} Pokémon! Release some before catching more.", limit),
            "limit_reached": true,
        })),
        Ok(CatchResult::LookupFailed { reason }) => failure(reason),
        Err(e) => failure(e),
    }
}

// ============================================================================
// get_user_collection
// ============================================================================

#[derive(Debug, Deserialize)]
struct UserParams {
    user_email: String,
}

fn get_user_collection_tool() -> RegisteredTool {
    ToolBuilder::new("get_user_collection")
        .description("Get a user's collection of caught Pokémon")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "user_email": {
                    "type": "string",
                    "description": "Email of the user"
                }
            },
            "required": ["user_email"]
        }))
        .build(get_user_collection_handler)
}

async fn get_user_collection_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: UserParams = parse_params(params)?;
    let Some(user) = ctx.find_user(&params.user_email)? else {
        return failure(USER_NOT_FOUND);
    };

    match ctx.collection_manager.list(user.id) {
        Ok(caught) => {
            let collection: Vec<CollectionEntry> = caught.iter().map(CollectionEntry::from).collect();
            json_result(json!({
                "success": true,
                "user_email": user.email,
                "count": collection.len(),
                "limit": COLLECTION_LIMIT,
                "collection": collection,
            }))
        }
        Err(e) => failure(e),
    }
}

// ============================================================================
// release_pokemon
// ============================================================================

#[derive(Debug, Deserialize)]
struct ReleaseParams {
    user_email: String,
    #[serde(deserialize_with = "record_id")]
    pokemon_id: usize,
}

fn release_pokemon_tool() -> RegisteredTool {
    ToolBuilder::new("release_pokemon")
        .description("Release a Pokémon from a user's collection")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "user_email": {
                    "type": "string",
                    "description": "Email of the user"
                },
                "pokemon_id": {
                    "type": "integer",
                    "description": "Database ID of the caught Pokémon to release"
                }
            },
            "required": ["user_email", "pokemon_id"]
        }))
        .build(release_pokemon_handler)
}

async fn release_pokemon_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ReleaseParams = parse_params(params)?;
    let Some(user) = ctx.find_user(&params.user_email)? else {
        return failure(USER_NOT_FOUND);
    };

    match ctx.collection_manager.release(user.id, params.pokemon_id) {
        Ok(released) => json_result(json!({
            "success": true,
            "message": format!("Released {} back to the wild.", capitalize(&released.pokemon.name)),
            "remaining_count": released.remaining_count,
        })),
        Err(PokeError::NotFound(_)) => failure("Pokémon not found in user's collection"),
        Err(e) => failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::test_support::{tool_json, TestContext};

    #[tokio::test]
    async fn catch_requires_a_known_user() {
        let test = TestContext::new();
        let result = tool_json(
            attempt_catch_pokemon_handler(
                test.ctx(),
                json!({"pokemon_id": "pikachu", "user_email": "nobody@example.com"}),
            )
            .await,
        );
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "User not found");
    }

    #[tokio::test]
    async fn catch_adds_to_the_collection() {
        let test = TestContext::new();
        test.add_user("ash@example.com");

        let result = tool_json(
            attempt_catch_pokemon_handler(
                test.ctx(),
                json!({"pokemon_id": 25, "user_email": "ash@example.com"}),
            )
            .await,
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["message"], "Gotcha! You caught Pikachu.");
        assert_eq!(result["pokemon_count"], 1);
        assert!(result["caught_pokemon_id"].is_number());
    }

    #[tokio::test]
    async fn failed_catch_reports_the_escape() {
        let test = TestContext::with_draw(0.99);
        test.add_user("ash@example.com");

        let result = tool_json(
            attempt_catch_pokemon_handler(
                test.ctx(),
                json!({"pokemon_id": "pikachu", "user_email": "ash@example.com"}),
            )
            .await,
        );
        assert_eq!(result["success"], false);
        assert_eq!(result["message"], "Pikachu broke free!");
    }

    #[tokio::test]
    async fn catch_at_limit_is_rejected() {
        let test = TestContext::new();
        for _ in 0..COLLECTION_LIMIT {
            test.give("ash@example.com", "pikachu");
        }

        let result = tool_json(
            attempt_catch_pokemon_handler(
                test.ctx(),
                json!({"pokemon_id": "pikachu", "user_email": "ash@example.com"}),
            )
            .await,
        );
        assert_eq!(result["success"], false);
        assert_eq!(result["limit_reached"], true);
        assert_eq!(
            result["error"],
            "User already has 10 Pokémon! Release some before catching more."
        );
    }

    #[tokio::test]
    async fn collection_lists_entries_with_ids() {
        let test = TestContext::new();
        test.give("ash@example.com", "pikachu");
        test.give("ash@example.com", "bulbasaur");

        let result = tool_json(
            get_user_collection_handler(test.ctx(), json!({"user_email": "ash@example.com"})).await,
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["count"], 2);
        assert_eq!(result["user_email"], "ash@example.com");
        let collection = result["collection"].as_array().unwrap();
        assert!(collection.iter().all(|p| p["id"].is_number()));
    }

    #[tokio::test]
    async fn release_is_scoped_to_the_owner() {
        let test = TestContext::new();
        let id = test.give("ash@example.com", "pikachu");
        test.add_user("gary@example.com");

        let result = tool_json(
            release_pokemon_handler(
                test.ctx(),
                json!({"user_email": "gary@example.com", "pokemon_id": id}),
            )
            .await,
        );
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "Pokémon not found in user's collection");

        let result = tool_json(
            release_pokemon_handler(
                test.ctx(),
                json!({"user_email": "ash@example.com", "pokemon_id": id}),
            )
            .await,
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["message"], "Released Pikachu back to the wild.");
        assert_eq!(result["remaining_count"], 0);
    }
}
