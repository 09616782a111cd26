//! Client for the public PokéAPI catalog.
//!
//! Lookups are a single attempt with no caching: every call reaches the upstream.

mod client;
mod models;

pub use client::{PokeApiClient, DEFAULT_POKEAPI_URL};
pub use models::PokemonRecord;

use async_trait::async_trait;
use rand::Rng;

/// Highest catalog id handed out by random picks.
pub const MAX_RANDOM_POKEMON_ID: u32 = 898;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Pokemon identifier cannot be blank")]
    BlankIdentifier,

    #[error("Pokemon '{0}' not found")]
    NotFound(String),

    #[error("PokeAPI error: {0}")]
    UpstreamStatus(u16),

    #[error("PokeAPI request timed out")]
    Timeout,

    #[error("PokeAPI request failed: {0}")]
    Transport(String),

    #[error("Unexpected PokeAPI response: {0}")]
    InvalidResponse(String),
}

/// Resolves an identifier (numeric id or name) to a normalized record.
#[async_trait]
pub trait PokemonLookup: Send + Sync {
    async fn lookup(&self, identifier: &str) -> Result<PokemonRecord, LookupError>;
}

/// Trims and lowercases an identifier, rejecting blank input.
pub fn normalize_identifier(identifier: &str) -> Result<String, LookupError> {
    let normalized = identifier.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(LookupError::BlankIdentifier);
    }
    Ok(normalized)
}

/// Uniform id in `[1, MAX_RANDOM_POKEMON_ID]`.
pub fn random_id() -> u32 {
    random_id_up_to(MAX_RANDOM_POKEMON_ID)
}

/// Uniform id in `[1, max_id]`; a zero bound is treated as 1.
pub fn random_id_up_to(max_id: u32) -> u32 {
    rand::rng().random_range(1..=max_id.max(1))
}
