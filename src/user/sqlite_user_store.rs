use crate::collection::{CaughtPokemon, CollectionStats, CollectionStore, MostCaught};
use crate::pokeapi::PokemonRecord;
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::user::{normalize_email, AuthToken, AuthTokenValue, User, UserAuthTokenStore, UserStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};
use tracing::debug;

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};
const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "value",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[],
};
const CAUGHT_POKEMON_TABLE_V_0: Table = Table {
    name: "caught_pokemon",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("poke_id", &SqlType::Integer, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("base_experience", &SqlType::Integer, non_null = true),
        sqlite_column!("sprite_url", &SqlType::Text),
        // Milliseconds since the epoch.
        sqlite_column!("caught_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[],
};

/// V 1
/// Adds the per-user listing index on caught_pokemon.
const CAUGHT_POKEMON_TABLE_V_1: Table = Table {
    name: "caught_pokemon",
    columns: CAUGHT_POKEMON_TABLE_V_0.columns,
    indices: &[("idx_caught_pokemon_user_caught_at", "user_id, caught_at")],
};

const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[USER_TABLE_V_0, AUTH_TOKEN_TABLE_V_0, CAUGHT_POKEMON_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[USER_TABLE_V_0, AUTH_TOKEN_TABLE_V_0, CAUGHT_POKEMON_TABLE_V_1],
        migration: Some(migrate_v0_to_v1),
    },
];

fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    CAUGHT_POKEMON_TABLE_V_1.create_index(conn, "idx_caught_pokemon_user_caught_at")
}

const CAUGHT_POKEMON_COLUMNS: &str =
    "id, user_id, poke_id, name, base_experience, sprite_url, caught_at";

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), VERSIONED_SCHEMAS)?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn insert_caught_pokemon(
        conn: &Connection,
        user_id: usize,
        pokemon: &PokemonRecord,
    ) -> Result<CaughtPokemon> {
        let caught_at = Utc::now();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, poke_id, name, base_experience, sprite_url, caught_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                CAUGHT_POKEMON_TABLE_V_1.name
            ),
            params![
                user_id,
                pokemon.poke_id,
                pokemon.name,
                pokemon.base_experience,
                pokemon.sprite_url,
                caught_at.timestamp_millis()
            ],
        )
        .with_context(|| format!("Failed to store {} for user {}", pokemon.name, user_id))?;

        let id = conn.last_insert_rowid() as usize;
        debug!("User {} caught {} (record {})", user_id, pokemon.name, id);
        Ok(CaughtPokemon {
            id,
            user_id,
            poke_id: pokemon.poke_id,
            name: pokemon.name.clone(),
            base_experience: pokemon.base_experience,
            sprite_url: pokemon.sprite_url.clone(),
            // Round-trip through millis so the value matches what a later read returns.
            caught_at: datetime_from_millis(caught_at.timestamp_millis()),
        })
    }

    fn count_for_user(conn: &Connection, user_id: usize) -> Result<usize> {
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE user_id = ?1",
                CAUGHT_POKEMON_TABLE_V_1.name
            ),
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn datetime_from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(value.max(0) as u64)
}

fn secs_since_epoch(time: SystemTime) -> i64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn caught_pokemon_from_row(row: &Row) -> rusqlite::Result<CaughtPokemon> {
    Ok(CaughtPokemon {
        id: row.get::<_, i64>(0)? as usize,
        user_id: row.get::<_, i64>(1)? as usize,
        poke_id: row.get(2)?,
        name: row.get(3)?,
        base_experience: row.get(4)?,
        sprite_url: row.get(5)?,
        caught_at: datetime_from_millis(row.get(6)?),
    })
}

fn auth_token_from_row(row: &Row) -> rusqlite::Result<AuthToken> {
    Ok(AuthToken {
        user_id: row.get::<_, i64>(0)? as usize,
        value: AuthTokenValue(row.get(1)?),
        created: system_time_from_column_result(row.get(2)?),
        last_used: row
            .get::<_, Option<i64>>(3)?
            .map(system_time_from_column_result),
    })
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let token = conn
            .query_row(
                &format!(
                    "SELECT user_id, value, created, last_used FROM {} WHERE value = ?1",
                    AUTH_TOKEN_TABLE_V_0.name
                ),
                params![token.0],
                auth_token_from_row,
            )
            .optional()?;
        Ok(token)
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let existing = conn
            .query_row(
                &format!(
                    "SELECT user_id, value, created, last_used FROM {} WHERE value = ?1",
                    AUTH_TOKEN_TABLE_V_0.name
                ),
                params![token.0],
                auth_token_from_row,
            )
            .optional()?;
        if existing.is_some() {
            conn.execute(
                &format!("DELETE FROM {} WHERE value = ?1", AUTH_TOKEN_TABLE_V_0.name),
                params![token.0],
            )?;
        }
        Ok(existing)
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET last_used = ?1 WHERE value = ?2",
                AUTH_TOKEN_TABLE_V_0.name
            ),
            params![secs_since_epoch(SystemTime::now()), token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, value, created, last_used) VALUES (?1, ?2, ?3, ?4)",
                AUTH_TOKEN_TABLE_V_0.name
            ),
            params![
                token.user_id,
                token.value.0,
                secs_since_epoch(token.created),
                token.last_used.map(secs_since_epoch)
            ],
        )
        .context("Failed to store auth token")?;
        Ok(())
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, email: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("INSERT INTO {} (email) VALUES (?1)", USER_TABLE_V_0.name),
            params![normalize_email(email)],
        )
        .with_context(|| format!("Failed to create user {}", email))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!("SELECT id, email FROM {} WHERE id = ?1", USER_TABLE_V_0.name),
                params![user_id],
                |row| {
                    Ok(User {
                        id: row.get::<_, i64>(0)? as usize,
                        email: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_id(&self, email: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                &format!("SELECT id FROM {} WHERE email = ?1", USER_TABLE_V_0.name),
                params![normalize_email(email)],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as usize))
    }

    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, email FROM {} ORDER BY id",
            USER_TABLE_V_0.name
        ))?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get::<_, i64>(0)? as usize,
                    email: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn delete_user(&self, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", USER_TABLE_V_0.name),
            params![user_id],
        )?;
        Ok(deleted > 0)
    }
}

impl CollectionStore for SqliteUserStore {
    fn add_caught_pokemon(&self, user_id: usize, pokemon: &PokemonRecord) -> Result<CaughtPokemon> {
        let conn = self.conn.lock().unwrap();
        Self::insert_caught_pokemon(&conn, user_id, pokemon)
    }

    fn add_caught_pokemon_if_below(
        &self,
        user_id: usize,
        pokemon: &PokemonRecord,
        limit: usize,
    ) -> Result<Option<(CaughtPokemon, usize)>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let count = Self::count_for_user(&tx, user_id)?;
        if count >= limit {
            return Ok(None);
        }
        let caught = Self::insert_caught_pokemon(&tx, user_id, pokemon)?;
        tx.commit()?;
        Ok(Some((caught, count + 1)))
    }

    fn list_caught_pokemon(&self, user_id: usize) -> Result<Vec<CaughtPokemon>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE user_id = ?1 ORDER BY caught_at DESC, id DESC",
            CAUGHT_POKEMON_COLUMNS, CAUGHT_POKEMON_TABLE_V_1.name
        ))?;
        let caught = stmt
            .query_map(params![user_id], caught_pokemon_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(caught)
    }

    fn count_caught_pokemon(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Self::count_for_user(&conn, user_id)
    }

    fn release_caught_pokemon(
        &self,
        user_id: usize,
        id: usize,
    ) -> Result<Option<(CaughtPokemon, usize)>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let existing = tx
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1 AND user_id = ?2",
                    CAUGHT_POKEMON_COLUMNS, CAUGHT_POKEMON_TABLE_V_1.name
                ),
                params![id, user_id],
                caught_pokemon_from_row,
            )
            .optional()?;
        let Some(existing) = existing else {
            return Ok(None);
        };
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE id = ?1 AND user_id = ?2",
                CAUGHT_POKEMON_TABLE_V_1.name
            ),
            params![id, user_id],
        )?;
        let remaining = Self::count_for_user(&tx, user_id)?;
        tx.commit()?;
        Ok(Some((existing, remaining)))
    }

    fn count_times_caught(&self, poke_id: u32) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE poke_id = ?1",
                CAUGHT_POKEMON_TABLE_V_1.name
            ),
            params![poke_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn get_collection_stats(&self) -> Result<CollectionStats> {
        let conn = self.conn.lock().unwrap();
        let (total_pokemon_caught, active_users): (i64, i64) = conn.query_row(
            &format!(
                "SELECT COUNT(*), COUNT(DISTINCT user_id) FROM {}",
                CAUGHT_POKEMON_TABLE_V_1.name
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let total_users: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", USER_TABLE_V_0.name),
            [],
            |row| row.get(0),
        )?;
        let most_caught_pokemon = conn
            .query_row(
                &format!(
                    "SELECT name, COUNT(*) AS times FROM {} GROUP BY name ORDER BY times DESC, name ASC LIMIT 1",
                    CAUGHT_POKEMON_TABLE_V_1.name
                ),
                [],
                |row| {
                    Ok(MostCaught {
                        name: row.get(0)?,
                        count: row.get::<_, i64>(1)? as usize,
                    })
                },
            )
            .optional()?;

        Ok(CollectionStats {
            total_pokemon_caught: total_pokemon_caught as usize,
            total_users: total_users as usize,
            active_users: active_users as usize,
            most_caught_pokemon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_persistence::{read_db_version, BASE_DB_VERSION};
    use tempfile::TempDir;

    fn create_tmp_store() -> (SqliteUserStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteUserStore::new(temp_dir.path().join("test.db")).unwrap();
        (store, temp_dir)
    }

    fn pikachu() -> PokemonRecord {
        PokemonRecord {
            poke_id: 25,
            name: "pikachu".to_string(),
            base_experience: 112,
            sprite_url: Some("https://img/25.png".to_string()),
        }
    }

    fn bulbasaur() -> PokemonRecord {
        PokemonRecord {
            poke_id: 1,
            name: "bulbasaur".to_string(),
            base_experience: 64,
            sprite_url: None,
        }
    }

    #[test]
    fn creates_users_with_normalized_emails() {
        let (store, _dir) = create_tmp_store();
        let id = store.create_user("  Ash.Ketchum@Pokemon.com ").unwrap();

        assert_eq!(store.get_user_id("ash.ketchum@pokemon.com").unwrap(), Some(id));
        assert_eq!(store.get_user_id("ASH.KETCHUM@POKEMON.COM").unwrap(), Some(id));
        assert_eq!(
            store.get_user(id).unwrap(),
            Some(User {
                id,
                email: "ash.ketchum@pokemon.com".to_string()
            })
        );
        assert!(store.create_user("ash.ketchum@pokemon.com").is_err());
        assert_eq!(store.get_user_id("misty@cerulean.gym").unwrap(), None);
    }

    #[test]
    fn handles_auth_tokens() {
        let (store, _dir) = create_tmp_store();
        let user_id = store.create_user("demo@example.com").unwrap();
        let value = AuthTokenValue::generate();
        store
            .add_user_auth_token(AuthToken {
                user_id,
                created: SystemTime::now(),
                last_used: None,
                value: value.clone(),
            })
            .unwrap();

        let token = store.get_user_auth_token(&value).unwrap().unwrap();
        assert_eq!(token.user_id, user_id);
        assert!(token.last_used.is_none());

        store
            .update_user_auth_token_last_used_timestamp(&value)
            .unwrap();
        assert!(store
            .get_user_auth_token(&value)
            .unwrap()
            .unwrap()
            .last_used
            .is_some());

        assert!(store.delete_user_auth_token(&value).unwrap().is_some());
        assert!(store.get_user_auth_token(&value).unwrap().is_none());
        assert!(store.delete_user_auth_token(&value).unwrap().is_none());
    }

    #[test]
    fn lists_most_recent_first_and_is_stable() {
        let (store, _dir) = create_tmp_store();
        let user_id = store.create_user("demo@example.com").unwrap();

        let first = store.add_caught_pokemon(user_id, &pikachu()).unwrap();
        let second = store.add_caught_pokemon(user_id, &bulbasaur()).unwrap();
        let third = store.add_caught_pokemon(user_id, &pikachu()).unwrap();

        let listed = store.list_caught_pokemon(user_id).unwrap();
        let ids: Vec<usize> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
        assert_eq!(listed[2], first);
        assert_eq!(store.list_caught_pokemon(user_id).unwrap(), listed);
        assert_eq!(store.count_caught_pokemon(user_id).unwrap(), 3);
    }

    #[test]
    fn conditional_insert_respects_limit() {
        let (store, _dir) = create_tmp_store();
        let user_id = store.create_user("demo@example.com").unwrap();

        for _ in 0..3 {
            assert!(store
                .add_caught_pokemon_if_below(user_id, &pikachu(), 3)
                .unwrap()
                .is_some());
        }
        assert!(store
            .add_caught_pokemon_if_below(user_id, &pikachu(), 3)
            .unwrap()
            .is_none());
        assert_eq!(store.count_caught_pokemon(user_id).unwrap(), 3);
    }

    #[test]
    fn concurrent_conditional_inserts_never_exceed_limit() {
        let (store, _dir) = create_tmp_store();
        let user_id = store.create_user("demo@example.com").unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .add_caught_pokemon_if_below(user_id, &pikachu(), 10)
                        .unwrap()
                        .map(|(_, count)| count)
                })
            })
            .collect();
        let mut counts: Vec<usize> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        counts.sort();

        // Each winner sees the count its own insert produced.
        assert_eq!(counts, (1..=10).collect::<Vec<_>>());
        assert_eq!(store.count_caught_pokemon(user_id).unwrap(), 10);
    }

    #[test]
    fn release_is_scoped_to_owner() {
        let (store, _dir) = create_tmp_store();
        let ash = store.create_user("ash.ketchum@pokemon.com").unwrap();
        let gary = store.create_user("gary.oak@pallet.town").unwrap();
        let ash_pikachu = store.add_caught_pokemon(ash, &pikachu()).unwrap();
        store.add_caught_pokemon(gary, &bulbasaur()).unwrap();

        assert_eq!(store.release_caught_pokemon(gary, ash_pikachu.id).unwrap(), None);
        assert_eq!(store.release_caught_pokemon(ash, 9999).unwrap(), None);
        assert_eq!(store.count_caught_pokemon(ash).unwrap(), 1);
        assert_eq!(store.count_caught_pokemon(gary).unwrap(), 1);

        let released = store.release_caught_pokemon(ash, ash_pikachu.id).unwrap();
        assert_eq!(released, Some((ash_pikachu, 0)));
        assert_eq!(store.count_caught_pokemon(ash).unwrap(), 0);
        assert_eq!(store.count_caught_pokemon(gary).unwrap(), 1);
    }

    #[test]
    fn concurrent_releases_report_distinct_remaining_counts() {
        let (store, _dir) = create_tmp_store();
        let user_id = store.create_user("demo@example.com").unwrap();
        let ids: Vec<usize> = (0..10)
            .map(|_| store.add_caught_pokemon(user_id, &pikachu()).unwrap().id)
            .collect();

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .release_caught_pokemon(user_id, id)
                        .unwrap()
                        .map(|(_, remaining)| remaining)
                })
            })
            .collect();
        let mut remaining: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        remaining.sort();

        assert_eq!(remaining, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn deleting_user_cascades() {
        let (store, _dir) = create_tmp_store();
        let user_id = store.create_user("demo@example.com").unwrap();
        store.add_caught_pokemon(user_id, &pikachu()).unwrap();

        assert!(store.delete_user(user_id).unwrap());
        assert_eq!(store.count_caught_pokemon(user_id).unwrap(), 0);
        assert_eq!(store.count_times_caught(25).unwrap(), 0);
        assert!(!store.delete_user(user_id).unwrap());
    }

    #[test]
    fn computes_stats() {
        let (store, _dir) = create_tmp_store();
        let ash = store.create_user("ash.ketchum@pokemon.com").unwrap();
        let misty = store.create_user("misty.waterflower@cerulean.gym").unwrap();
        store.create_user("brock.harrison@pewter.gym").unwrap();

        let empty = store.get_collection_stats().unwrap();
        assert_eq!(empty.total_pokemon_caught, 0);
        assert_eq!(empty.most_caught_pokemon, None);

        store.add_caught_pokemon(ash, &pikachu()).unwrap();
        store.add_caught_pokemon(ash, &pikachu()).unwrap();
        store.add_caught_pokemon(misty, &bulbasaur()).unwrap();

        let stats = store.get_collection_stats().unwrap();
        assert_eq!(stats.total_pokemon_caught, 3);
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.active_users, 2);
        assert_eq!(
            stats.most_caught_pokemon,
            Some(MostCaught {
                name: "pikachu".to_string(),
                count: 2
            })
        );
        assert_eq!(store.count_times_caught(25).unwrap(), 2);
        assert_eq!(store.count_times_caught(1).unwrap(), 1);
    }

    #[test]
    fn migrates_from_v0() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            VERSIONED_SCHEMAS[0].create(&conn).unwrap();
            assert_eq!(read_db_version(&conn).unwrap(), 0);
        }

        let store = SqliteUserStore::new(&db_path).unwrap();
        drop(store);

        let conn = Connection::open(&db_path).unwrap();
        let raw_version: i64 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(raw_version, BASE_DB_VERSION as i64 + 1);
        let index_exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_caught_pokemon_user_caught_at'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(index_exists, 1);
    }
}
