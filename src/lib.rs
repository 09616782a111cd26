//! Pokécatch server library
//!
//! Shared by the HTTP server, the JSON-RPC tool server and the user management CLI.

pub mod catch;
pub mod collection;
pub mod config;
pub mod errors;
pub mod mcp;
pub mod messages;
pub mod pokeapi;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

pub use catch::{CatchResult, CatchWorkflow};
pub use errors::{PokeError, PokeResult};
pub use pokeapi::{PokeApiClient, PokemonLookup, PokemonRecord};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{SqliteUserStore, UserStore};
