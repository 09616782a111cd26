//! HTTP client for the PokéAPI `/pokemon/{id-or-name}/` endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::debug;

use super::models::ApiPokemon;
use super::{normalize_identifier, LookupError, PokemonLookup, PokemonRecord};
use crate::server::metrics;

pub const DEFAULT_POKEAPI_URL: &str = "https://pokeapi.co/api/v2";

pub struct PokeApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://pokeapi.co/api/v2")
    /// * `timeout` - Upper bound for a whole lookup, a timeout is reported as a lookup failure
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn pokemon_url(&self, identifier: &str) -> String {
        format!(
            "{}/pokemon/{}/",
            self.base_url,
            urlencoding::encode(identifier)
        )
    }

    async fn fetch(&self, identifier: &str) -> Result<PokemonRecord, LookupError> {
        let url = self.pokemon_url(identifier);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(identifier.to_string()));
        }
        if !status.is_success() {
            return Err(LookupError::UpstreamStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_error)?;
        let pokemon: ApiPokemon = serde_json::from_str(&body)
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;
        Ok(pokemon.into())
    }
}

fn transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout
    } else {
        LookupError::Transport(err.to_string())
    }
}

#[async_trait]
impl PokemonLookup for PokeApiClient {
    async fn lookup(&self, identifier: &str) -> Result<PokemonRecord, LookupError> {
        let identifier = normalize_identifier(identifier)?;
        let start = Instant::now();
        let result = self.fetch(&identifier).await;
        metrics::record_lookup(result.is_ok(), start.elapsed());
        result
    }
}
