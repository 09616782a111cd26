use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pokecatch_server::catch::ThreadRngSource;
use pokecatch_server::config::{AppConfig, CliConfig, FileConfig};
use pokecatch_server::pokeapi::{PokeApiClient, DEFAULT_POKEAPI_URL};
use pokecatch_server::server::{self, run_server, RequestsLoggingLevel, ServerConfig};
use pokecatch_server::user::{JwtIssuer, SqliteUserStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the SQLite database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the Pokémon API.
    #[clap(long, default_value = DEFAULT_POKEAPI_URL)]
    pub pokeapi_url: String,

    /// Timeout in seconds for a single Pokémon lookup.
    #[clap(long, default_value_t = 5)]
    pub pokeapi_timeout_sec: u64,

    /// Secret used to sign API tokens.
    #[clap(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Lifetime of API tokens in hours.
    #[clap(long, default_value_t = 24)]
    pub jwt_ttl_hours: u64,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        CliConfig {
            db_dir: args.db_dir,
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level,
            pokeapi_url: args.pokeapi_url,
            pokeapi_timeout_sec: args.pokeapi_timeout_sec,
            jwt_secret: args.jwt_secret,
            jwt_ttl_hours: args.jwt_ttl_hours,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match cli_args.config.take() {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(&path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.into(), file_config)?;
    info!("Starting pokecatch-server {}", env!("GIT_HASH"));

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    let db_path = config.db_path();
    info!("Opening SQLite database at {:?}...", db_path);
    let user_store = Arc::new(SqliteUserStore::new(&db_path)?);

    info!("Using PokéAPI at {}", config.pokeapi.url);
    let lookup = Arc::new(PokeApiClient::new(&config.pokeapi.url, config.pokeapi.timeout)?);
    let jwt_issuer = JwtIssuer::new(config.jwt.secret.as_bytes(), config.jwt.ttl);

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level,
        port: config.port,
        metrics_port: config.metrics_port,
    };

    info!("Ready to serve at port {}!", server_config.port);
    info!("Metrics available at port {}!", server_config.metrics_port);
    run_server(
        server_config,
        user_store,
        lookup,
        Arc::new(ThreadRngSource),
        jwt_issuer,
    )
    .await
}
