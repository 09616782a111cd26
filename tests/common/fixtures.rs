//! Test fixture creation
//!
//! Creates the temporary database and the stub Pokémon lookup used by every
//! test server.

use super::constants::*;
use async_trait::async_trait;
use pokecatch_server::pokeapi::{LookupError, PokemonLookup, PokemonRecord};
use pokecatch_server::user::{SqliteUserStore, UserStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Creates a database with [`TEST_USER_EMAIL`] and [`OTHER_USER_EMAIL`].
pub fn create_test_db_with_users() -> anyhow::Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("pokecatch.db");
    let store = SqliteUserStore::new(&db_path)?;
    store.create_user(TEST_USER_EMAIL)?;
    store.create_user(OTHER_USER_EMAIL)?;
    Ok((dir, db_path))
}

/// Lookup that never leaves the process. Counts every call.
#[derive(Default)]
pub struct StubLookup {
    calls: AtomicUsize,
}

impl StubLookup {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn record(poke_id: u32, name: &str, base_experience: u32) -> PokemonRecord {
    PokemonRecord {
        poke_id,
        name: name.to_string(),
        base_experience,
        sprite_url: Some(format!("https://sprites.example/{}.png", poke_id)),
    }
}

#[async_trait]
impl PokemonLookup for StubLookup {
    async fn lookup(&self, identifier: &str) -> Result<PokemonRecord, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let identifier = identifier.trim().to_lowercase();
        match identifier.as_str() {
            "" => Err(LookupError::BlankIdentifier),
            "25" | PIKACHU_NAME => Ok(record(PIKACHU_ID, PIKACHU_NAME, PIKACHU_BASE_EXPERIENCE)),
            "1" | BULBASAUR_NAME => Ok(record(BULBASAUR_ID, BULBASAUR_NAME, 64)),
            SLOW_POKEMON => Err(LookupError::Timeout),
            other => match other.parse::<u32>() {
                Ok(id) if (1..=1025).contains(&id) => Ok(record(id, &format!("pokemon{}", id), 100)),
                _ => Err(LookupError::NotFound(other.to_string())),
            },
        }
    }
}
