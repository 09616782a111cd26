use std::sync::Arc;
use tracing::info;

use super::{CaughtPokemon, CollectionStats, UserCollection};
use crate::errors::{PokeError, PokeResult};
use crate::server::metrics;
use crate::user::FullUserStore;

#[derive(Debug)]
pub struct ReleasedPokemon {
    pub pokemon: CaughtPokemon,
    pub remaining_count: usize,
}

/// Read and release operations over users' collections.
pub struct CollectionManager {
    store: Arc<dyn FullUserStore>,
}

impl CollectionManager {
    pub fn new(store: Arc<dyn FullUserStore>) -> Self {
        Self { store }
    }

    pub fn list(&self, user_id: usize) -> PokeResult<Vec<CaughtPokemon>> {
        Ok(self.store.list_caught_pokemon(user_id)?)
    }

    pub fn count(&self, user_id: usize) -> PokeResult<usize> {
        Ok(self.store.count_caught_pokemon(user_id)?)
    }

    /// Releases one of the user's records. Records owned by someone else are
    /// reported exactly like records that do not exist.
    pub fn release(&self, user_id: usize, id: usize) -> PokeResult<ReleasedPokemon> {
        let Some((pokemon, remaining_count)) = self.store.release_caught_pokemon(user_id, id)?
        else {
            return Err(PokeError::NotFound(
                "Pokemon not found in your collection".to_string(),
            ));
        };
        metrics::record_release();
        info!(
            "User {} released {} ({} remaining)",
            user_id, pokemon.name, remaining_count
        );
        Ok(ReleasedPokemon {
            pokemon,
            remaining_count,
        })
    }

    pub fn times_caught(&self, poke_id: u32) -> PokeResult<usize> {
        Ok(self.store.count_times_caught(poke_id)?)
    }

    /// Every user with their collection, ordered by user id.
    pub fn all_collections(&self) -> PokeResult<Vec<UserCollection>> {
        self.store
            .get_all_users()?
            .into_iter()
            .map(|user| -> PokeResult<UserCollection> {
                Ok(UserCollection {
                    pokemon: self.store.list_caught_pokemon(user.id)?,
                    user_id: user.id,
                    email: user.email,
                })
            })
            .collect()
    }

    pub fn stats(&self) -> PokeResult<CollectionStats> {
        Ok(self.store.get_collection_stats()?)
    }
}
