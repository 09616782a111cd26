//! JSON API under `/api`, authenticated with bearer tokens.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use super::session::ApiUser;
use super::state::{GuardedCatchWorkflow, GuardedCollectionManager, GuardedJwtIssuer, GuardedUserManager, ServerState};
use crate::catch::CatchResult;
use crate::collection::CaughtPokemon;
use crate::errors::PokeError;
use crate::messages;
use crate::user::{normalize_email, User};

pub(super) fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Maps a service error to a response. Lookup failures use `lookup_status` since
/// they mean "not found" when showing a Pokémon but "unprocessable" when catching.
pub(super) fn poke_error_response(err: PokeError, lookup_status: StatusCode) -> Response {
    match err {
        PokeError::Validation(message) => error_json(StatusCode::UNPROCESSABLE_ENTITY, &message),
        PokeError::Lookup(e) => error_json(lookup_status, &e.to_string()),
        PokeError::NotFound(message) => error_json(StatusCode::NOT_FOUND, &message),
        e @ PokeError::LimitReached { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "success": false,
                "error": e.to_string(),
                "limit_reached": true,
            })),
        )
            .into_response(),
        PokeError::Storage(e) => {
            error!("Storage failure: {:#}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Response body shared by the web and API catch endpoints.
pub(super) fn catch_response(result: Result<CatchResult, PokeError>) -> Response {
    match result {
        Ok(CatchResult::Caught {
            pokemon,
            record,
            count,
        }) => Json(json!({
            "success": true,
            "message": messages::caught_message(&pokemon.name),
            "pokemon_count": count,
            "caught_pokemon_id": record.id,
            "pokemon": pokemon,
        }))
        .into_response(),
        Ok(CatchResult::Fled { pokemon }) => Json(json!({
            "success": false,
            "message": messages::fled_message(&pokemon.name),
            "pokemon": pokemon,
        }))
        .into_response(),
        Ok(CatchResult::LimitReached { limit }) => {
            poke_error_response(PokeError::LimitReached { limit }, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Ok(CatchResult::LookupFailed { reason }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "error": reason.to_string() })),
        )
            .into_response(),
        Err(e @ PokeError::Validation(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => poke_error_response(e, StatusCode::UNPROCESSABLE_ENTITY),
    }
}

#[derive(Deserialize, Debug)]
struct ApiLoginBody {
    email: Option<String>,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
    user: User,
}

fn token_response(jwt_issuer: &GuardedJwtIssuer, user: User) -> Response {
    match jwt_issuer.issue(user.id) {
        Ok(token) => Json(TokenResponse { token, user }).into_response(),
        Err(e) => {
            error!("Failed to issue token for user {}: {:#}", user.id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn api_login(
    State(user_manager): State<GuardedUserManager>,
    State(jwt_issuer): State<GuardedJwtIssuer>,
    body: Result<Json<ApiLoginBody>, JsonRejection>,
) -> Response {
    // A missing or malformed body counts as a blank email.
    let email = match body {
        Ok(Json(body)) => normalize_email(body.email.as_deref().unwrap_or_default()),
        Err(rejection) => {
            debug!("Unreadable login body: {}", rejection);
            String::new()
        }
    };
    if email.is_empty() {
        return error_json(StatusCode::UNPROCESSABLE_ENTITY, "Email is required");
    }
    match user_manager.find_user_by_email(&email) {
        Ok(Some(user)) => token_response(&jwt_issuer, user),
        Ok(None) => {
            debug!("API login for unknown email {}", email);
            error_json(StatusCode::NOT_FOUND, "User not found")
        }
        Err(e) => poke_error_response(e.into(), StatusCode::NOT_FOUND),
    }
}

async fn api_refresh(State(jwt_issuer): State<GuardedJwtIssuer>, ApiUser(user): ApiUser) -> Response {
    token_response(&jwt_issuer, user)
}

async fn get_random_pokemon(State(workflow): State<GuardedCatchWorkflow>) -> Response {
    match workflow.random_pokemon().await {
        Ok(pokemon) => Json(pokemon).into_response(),
        Err(e) => poke_error_response(e, StatusCode::NOT_FOUND),
    }
}

async fn get_pokemon(
    State(workflow): State<GuardedCatchWorkflow>,
    Path(name): Path<String>,
) -> Response {
    if name.trim().is_empty() {
        return error_json(StatusCode::UNPROCESSABLE_ENTITY, "Pokemon name is required");
    }
    match workflow.lookup(&name).await {
        Ok(pokemon) => Json(pokemon).into_response(),
        Err(e) => poke_error_response(e, StatusCode::NOT_FOUND),
    }
}

async fn catch_pokemon(
    State(workflow): State<GuardedCatchWorkflow>,
    ApiUser(user): ApiUser,
    Path(identifier): Path<String>,
) -> Response {
    catch_response(workflow.attempt_catch(user.id, &identifier).await)
}

/// Collection entry without the record id.
#[derive(Serialize)]
struct CaughtPokemonSummary<'a> {
    poke_id: u32,
    name: &'a str,
    base_experience: u32,
    sprite_url: Option<&'a str>,
    caught_at: DateTime<Utc>,
}

impl<'a> From<&'a CaughtPokemon> for CaughtPokemonSummary<'a> {
    fn from(value: &'a CaughtPokemon) -> Self {
        CaughtPokemonSummary {
            poke_id: value.poke_id,
            name: &value.name,
            base_experience: value.base_experience,
            sprite_url: value.sprite_url.as_deref(),
            caught_at: value.caught_at,
        }
    }
}

#[derive(Serialize)]
struct CaughtPokemonEntry<'a> {
    id: usize,
    #[serde(flatten)]
    summary: CaughtPokemonSummary<'a>,
}

async fn get_caught_pokemons(
    State(collection): State<GuardedCollectionManager>,
    ApiUser(user): ApiUser,
) -> Response {
    match collection.list(user.id) {
        Ok(caught) => {
            Json(caught.iter().map(CaughtPokemonSummary::from).collect::<Vec<_>>()).into_response()
        }
        Err(e) => poke_error_response(e, StatusCode::NOT_FOUND),
    }
}

async fn get_user_caught_pokemons(
    State(collection): State<GuardedCollectionManager>,
    ApiUser(user): ApiUser,
) -> Response {
    match collection.list(user.id) {
        Ok(caught) => Json(
            caught
                .iter()
                .map(|p| CaughtPokemonEntry {
                    id: p.id,
                    summary: p.into(),
                })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => poke_error_response(e, StatusCode::NOT_FOUND),
    }
}

const RELEASE_NOT_FOUND: &str = "Pokémon not found or does not belong to this user";

async fn release_caught_pokemon(
    State(collection): State<GuardedCollectionManager>,
    ApiUser(user): ApiUser,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<usize>() else {
        return error_json(StatusCode::NOT_FOUND, RELEASE_NOT_FOUND);
    };
    match collection.release(user.id, id) {
        Ok(released) => Json(json!({
            "message": messages::released_message(&released.pokemon.name),
            "released_pokemon": {
                "id": released.pokemon.id,
                "name": released.pokemon.name,
            },
            "remaining_count": released.remaining_count,
        }))
        .into_response(),
        Err(PokeError::NotFound(_)) => error_json(StatusCode::NOT_FOUND, RELEASE_NOT_FOUND),
        Err(e) => poke_error_response(e, StatusCode::NOT_FOUND),
    }
}

pub fn make_api_routes(state: ServerState) -> Router {
    Router::new()
        .route("/login", post(api_login))
        .route("/refresh", post(api_refresh))
        .route("/pokemon/random", get(get_random_pokemon))
        .route("/pokemon/{name}", get(get_pokemon))
        .route("/pokemon/{identifier}/catch", post(catch_pokemon))
        .route("/caught_pokemons", get(get_caught_pokemons))
        .route("/users/caught_pokemons", get(get_user_caught_pokemons))
        .route("/users/caught_pokemons/{id}", delete(release_caught_pokemon))
        .with_state(state)
}
