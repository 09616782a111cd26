use anyhow::Result;

use super::{CaughtPokemon, CollectionStats};
use crate::pokeapi::PokemonRecord;

/// Persisted caught Pokémon. Every per-user operation is scoped to `user_id`.
pub trait CollectionStore: Send + Sync {
    /// Stores a new record for the user, stamped with the current time.
    fn add_caught_pokemon(&self, user_id: usize, pokemon: &PokemonRecord) -> Result<CaughtPokemon>;

    /// Stores a new record only if the user holds fewer than `limit` records.
    /// The check and the insert are atomic with respect to other writers.
    /// Returns the new record with the user's count right after the insert,
    /// or Ok(None) if the user is already at the limit.
    fn add_caught_pokemon_if_below(
        &self,
        user_id: usize,
        pokemon: &PokemonRecord,
        limit: usize,
    ) -> Result<Option<(CaughtPokemon, usize)>>;

    /// Returns the user's records, most recently caught first.
    fn list_caught_pokemon(&self, user_id: usize) -> Result<Vec<CaughtPokemon>>;

    fn count_caught_pokemon(&self, user_id: usize) -> Result<usize>;

    /// Deletes the record if it exists and belongs to the user.
    /// Returns the removed record with the user's remaining count, or Ok(None)
    /// otherwise, without telling the two cases apart.
    fn release_caught_pokemon(
        &self,
        user_id: usize,
        id: usize,
    ) -> Result<Option<(CaughtPokemon, usize)>>;

    /// Number of records of the given species across all users.
    fn count_times_caught(&self, poke_id: u32) -> Result<usize>;

    fn get_collection_stats(&self) -> Result<CollectionStats>;
}
