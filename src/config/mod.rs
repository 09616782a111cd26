mod file_config;

pub use file_config::{FileConfig, PokeApiConfig};

use crate::pokeapi::DEFAULT_POKEAPI_URL;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use rand::Rng;
use rand_distr::Alphanumeric;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DB_FILE_NAME: &str = "pokecatch.db";

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub pokeapi_url: String,
    pub pokeapi_timeout_sec: u64,
    pub jwt_secret: Option<String>,
    pub jwt_ttl_hours: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            port: 3000,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::default(),
            pokeapi_url: DEFAULT_POKEAPI_URL.to_string(),
            pokeapi_timeout_sec: 5,
            jwt_secret: None,
            jwt_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub pokeapi: PokeApiSettings,
    pub jwt: JwtSettings,
}

#[derive(Debug, Clone)]
pub struct PokeApiSettings {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub ttl: Duration,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let pokeapi_file = file.pokeapi.unwrap_or_default();
        let timeout_sec = pokeapi_file.timeout_sec.unwrap_or(cli.pokeapi_timeout_sec);
        if timeout_sec == 0 {
            bail!("PokeAPI timeout must be at least one second");
        }
        let pokeapi = PokeApiSettings {
            url: pokeapi_file.url.unwrap_or_else(|| cli.pokeapi_url.clone()),
            timeout: Duration::from_secs(timeout_sec),
        };

        let secret = match file.jwt_secret.or_else(|| cli.jwt_secret.clone()) {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("No JWT secret configured, generating a random one. API tokens will not survive a restart.");
                generate_secret()
            }
        };
        let jwt = JwtSettings {
            secret,
            ttl: Duration::from_secs(file.jwt_ttl_hours.unwrap_or(cli.jwt_ttl_hours) * 60 * 60),
        };

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            pokeapi,
            jwt,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join(DB_FILE_NAME)
    }
}

fn generate_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
