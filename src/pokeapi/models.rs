use serde::{Deserialize, Serialize};

/// Normalized view of an upstream Pokémon entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub poke_id: u32,
    pub name: String,
    pub base_experience: u32,
    pub sprite_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiSprites {
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiPokemon {
    pub id: u32,
    pub name: String,
    pub base_experience: Option<u32>,
    pub sprites: Option<ApiSprites>,
}

impl From<ApiPokemon> for PokemonRecord {
    fn from(value: ApiPokemon) -> Self {
        PokemonRecord {
            poke_id: value.id,
            name: value.name,
            base_experience: value.base_experience.unwrap_or(0),
            sprite_url: value.sprites.and_then(|s| s.front_default),
        }
    }
}
