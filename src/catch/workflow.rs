use std::sync::Arc;
use tracing::{debug, info, warn};

use super::probability::{self, RandomSource};
use crate::collection::{CaughtPokemon, COLLECTION_LIMIT};
use crate::errors::{PokeError, PokeResult};
use crate::pokeapi::{self, LookupError, PokemonLookup, PokemonRecord};
use crate::server::metrics;
use crate::user::FullUserStore;

#[derive(Debug)]
pub enum CatchResult {
    /// The user already holds the maximum; nothing was looked up or written.
    LimitReached { limit: usize },
    LookupFailed { reason: LookupError },
    Fled { pokemon: PokemonRecord },
    Caught {
        pokemon: PokemonRecord,
        record: CaughtPokemon,
        /// Collection size after the catch.
        count: usize,
    },
}

impl CatchResult {
    pub fn outcome_label(&self) -> &'static str {
        match self {
            CatchResult::LimitReached { .. } => "limit_reached",
            CatchResult::LookupFailed { .. } => "lookup_failed",
            CatchResult::Fled { .. } => "fled",
            CatchResult::Caught { .. } => "caught",
        }
    }
}

pub struct CatchWorkflow {
    lookup: Arc<dyn PokemonLookup>,
    store: Arc<dyn FullUserStore>,
    random: Arc<dyn RandomSource>,
}

impl CatchWorkflow {
    pub fn new(
        lookup: Arc<dyn PokemonLookup>,
        store: Arc<dyn FullUserStore>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            lookup,
            store,
            random,
        }
    }

    pub async fn lookup(&self, identifier: &str) -> PokeResult<PokemonRecord> {
        if identifier.trim().is_empty() {
            return Err(PokeError::Validation(
                "Pokemon identifier cannot be blank".to_string(),
            ));
        }
        Ok(self.lookup.lookup(identifier).await?)
    }

    /// Looks up a uniformly random catalog entry.
    pub async fn random_pokemon(&self) -> PokeResult<PokemonRecord> {
        self.random_pokemon_up_to(pokeapi::MAX_RANDOM_POKEMON_ID).await
    }

    pub async fn random_pokemon_up_to(&self, max_id: u32) -> PokeResult<PokemonRecord> {
        let id = pokeapi::random_id_up_to(max_id);
        debug!("Picked random pokemon id {}", id);
        self.lookup(&id.to_string()).await
    }

    /// Runs a full catch attempt for `user_id`.
    ///
    /// The capacity check happens before the lookup so a full collection never
    /// reaches the upstream. The write is a conditional insert, so a concurrent
    /// request that takes the last slot turns this attempt into `LimitReached`.
    pub async fn attempt_catch(&self, user_id: usize, identifier: &str) -> PokeResult<CatchResult> {
        if identifier.trim().is_empty() {
            return Err(PokeError::Validation(
                "Pokemon identifier cannot be blank".to_string(),
            ));
        }

        let result = self.run_attempt(user_id, identifier).await?;
        metrics::record_catch_attempt(result.outcome_label());
        Ok(result)
    }

    async fn run_attempt(&self, user_id: usize, identifier: &str) -> PokeResult<CatchResult> {
        if self.store.count_caught_pokemon(user_id)? >= COLLECTION_LIMIT {
            debug!("User {} is at the collection limit", user_id);
            return Ok(CatchResult::LimitReached {
                limit: COLLECTION_LIMIT,
            });
        }

        let pokemon = match self.lookup.lookup(identifier).await {
            Ok(pokemon) => pokemon,
            Err(reason) => {
                warn!("Lookup of '{}' failed: {}", identifier, reason);
                return Ok(CatchResult::LookupFailed { reason });
            }
        };

        if !probability::attempt(pokemon.base_experience, self.random.as_ref()) {
            info!("{} broke free from user {}", pokemon.name, user_id);
            return Ok(CatchResult::Fled { pokemon });
        }

        let Some((record, count)) =
            self.store
                .add_caught_pokemon_if_below(user_id, &pokemon, COLLECTION_LIMIT)?
        else {
            debug!("User {} filled the collection concurrently", user_id);
            return Ok(CatchResult::LimitReached {
                limit: COLLECTION_LIMIT,
            });
        };
        info!("User {} caught {} ({} total)", user_id, pokemon.name, count);

        Ok(CatchResult::Caught {
            pokemon,
            record,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catch::FixedDraw;
    use crate::collection::CollectionStore;
    use crate::user::{SqliteUserStore, UserStore};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct MockLookup {
        records: HashMap<String, PokemonRecord>,
        call_counts: Mutex<HashMap<String, usize>>,
    }

    impl MockLookup {
        fn new() -> Self {
            let mut records = HashMap::new();
            let pikachu = PokemonRecord {
                poke_id: 25,
                name: "pikachu".to_string(),
                base_experience: 112,
                sprite_url: Some("https://img/25.png".to_string()),
            };
            records.insert("pikachu".to_string(), pikachu.clone());
            records.insert("25".to_string(), pikachu);
            Self {
                records,
                call_counts: Mutex::new(HashMap::new()),
            }
        }

        fn total_calls(&self) -> usize {
            self.call_counts.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl PokemonLookup for MockLookup {
        async fn lookup(&self, identifier: &str) -> Result<PokemonRecord, LookupError> {
            let identifier = pokeapi::normalize_identifier(identifier)?;
            *self
                .call_counts
                .lock()
                .unwrap()
                .entry(identifier.clone())
                .or_insert(0) += 1;
            self.records
                .get(&identifier)
                .cloned()
                .ok_or(LookupError::NotFound(identifier))
        }
    }

    struct Fixture {
        workflow: CatchWorkflow,
        lookup: Arc<MockLookup>,
        store: Arc<SqliteUserStore>,
        user_id: usize,
        _dir: TempDir,
    }

    fn fixture(draw: f64) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteUserStore::new(dir.path().join("test.db")).unwrap());
        let user_id = store.create_user("ash.ketchum@pokemon.com").unwrap();
        let lookup = Arc::new(MockLookup::new());
        let workflow = CatchWorkflow::new(lookup.clone(), store.clone(), Arc::new(FixedDraw(draw)));
        Fixture {
            workflow,
            lookup,
            store,
            user_id,
            _dir: dir,
        }
    }

    fn pikachu_probability() -> f64 {
        probability::probability(112)
    }

    #[tokio::test]
    async fn low_draw_catches_and_persists() {
        let f = fixture(pikachu_probability() - 0.01);
        let result = f.workflow.attempt_catch(f.user_id, "Pikachu").await.unwrap();

        match result {
            CatchResult::Caught {
                pokemon,
                record,
                count,
            } => {
                assert_eq!(pokemon.poke_id, 25);
                assert_eq!(record.poke_id, 25);
                assert_eq!(record.user_id, f.user_id);
                assert_eq!(count, 1);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(f.store.count_caught_pokemon(f.user_id).unwrap(), 1);
    }

    #[tokio::test]
    async fn high_draw_flees_without_writing() {
        let f = fixture(pikachu_probability() + 0.01);
        let result = f.workflow.attempt_catch(f.user_id, "25").await.unwrap();

        assert!(matches!(result, CatchResult::Fled { pokemon } if pokemon.name == "pikachu"));
        assert_eq!(f.store.count_caught_pokemon(f.user_id).unwrap(), 0);
    }

    #[tokio::test]
    async fn full_collection_skips_lookup() {
        let f = fixture(0.0);
        for _ in 0..COLLECTION_LIMIT {
            f.store
                .add_caught_pokemon(f.user_id, &f.lookup.records["pikachu"])
                .unwrap();
        }

        let result = f.workflow.attempt_catch(f.user_id, "pikachu").await.unwrap();

        assert!(matches!(result, CatchResult::LimitReached { limit: 10 }));
        assert_eq!(f.lookup.total_calls(), 0);
        assert_eq!(f.store.count_caught_pokemon(f.user_id).unwrap(), 10);
    }

    #[tokio::test]
    async fn lookup_failure_writes_nothing() {
        let f = fixture(0.0);
        let result = f.workflow.attempt_catch(f.user_id, "missingno").await.unwrap();

        assert!(matches!(
            result,
            CatchResult::LookupFailed {
                reason: LookupError::NotFound(_)
            }
        ));
        assert_eq!(f.lookup.total_calls(), 1);
        assert_eq!(f.store.count_caught_pokemon(f.user_id).unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_identifier_is_a_validation_error() {
        let f = fixture(0.0);
        let result = f.workflow.attempt_catch(f.user_id, "  ").await;

        assert!(matches!(result, Err(PokeError::Validation(_))));
        assert_eq!(f.lookup.total_calls(), 0);
    }

    #[tokio::test]
    async fn tenth_catch_succeeds_and_eleventh_is_refused() {
        let f = fixture(0.0);
        for expected in 1..=COLLECTION_LIMIT {
            match f.workflow.attempt_catch(f.user_id, "pikachu").await.unwrap() {
                CatchResult::Caught { count, .. } => assert_eq!(count, expected),
                other => panic!("unexpected result {:?}", other),
            }
        }
        assert!(matches!(
            f.workflow.attempt_catch(f.user_id, "pikachu").await.unwrap(),
            CatchResult::LimitReached { .. }
        ));
    }

    #[tokio::test]
    async fn random_pokemon_looks_up_an_id_in_range() {
        let f = fixture(0.0);
        let result = f.workflow.random_pokemon_up_to(1).await;
        // Only "25" and "pikachu" are known to the mock, so id 1 is not found.
        assert!(matches!(
            result,
            Err(PokeError::Lookup(LookupError::NotFound(id))) if id == "1"
        ));
        assert_eq!(f.lookup.call_counts.lock().unwrap().get("1"), Some(&1));
    }
}
