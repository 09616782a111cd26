mod collection_manager;
mod collection_store;
mod models;

pub use collection_manager::{CollectionManager, ReleasedPokemon};
pub use collection_store::CollectionStore;
pub use models::{CaughtPokemon, CollectionStats, MostCaught, UserCollection};

/// Maximum number of live caught records a single user may hold.
pub const COLLECTION_LIMIT: usize = 10;
