use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pokeapi::PokemonRecord;

/// A Pokémon owned by a user. The descriptive fields are a snapshot taken at
/// catch time and are never refreshed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CaughtPokemon {
    pub id: usize,
    pub user_id: usize,
    pub poke_id: u32,
    pub name: String,
    pub base_experience: u32,
    pub sprite_url: Option<String>,
    pub caught_at: DateTime<Utc>,
}

impl CaughtPokemon {
    pub fn snapshot(&self) -> PokemonRecord {
        PokemonRecord {
            poke_id: self.poke_id,
            name: self.name.clone(),
            base_experience: self.base_experience,
            sprite_url: self.sprite_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MostCaught {
    pub name: String,
    pub count: usize,
}

/// Aggregates over every user's collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total_pokemon_caught: usize,
    pub total_users: usize,
    /// Users holding at least one Pokémon.
    pub active_users: usize,
    pub most_caught_pokemon: Option<MostCaught>,
}

impl CollectionStats {
    /// Mean collection size over active users, rounded to two decimals.
    pub fn average_pokemon_per_user(&self) -> f64 {
        if self.active_users == 0 {
            return 0.0;
        }
        let avg = self.total_pokemon_caught as f64 / self.active_users as f64;
        (avg * 100.0).round() / 100.0
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct UserCollection {
    pub user_id: usize,
    pub email: String,
    pub pokemon: Vec<CaughtPokemon>,
}
