use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pokecatch_server::catch::{CatchWorkflow, ThreadRngSource};
use pokecatch_server::collection::CollectionManager;
use pokecatch_server::config::{AppConfig, CliConfig, FileConfig};
use pokecatch_server::mcp::{run_stdio, McpServer, ToolContext};
use pokecatch_server::pokeapi::{PokeApiClient, DEFAULT_POKEAPI_URL};
use pokecatch_server::user::{SqliteUserStore, UserManager};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the SQLite database.
    #[clap(long)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the Pokémon API.
    #[clap(long, default_value = DEFAULT_POKEAPI_URL)]
    pub pokeapi_url: String,

    /// Timeout in seconds for a single Pokémon lookup.
    #[clap(long, default_value_t = 5)]
    pub pokeapi_timeout_sec: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // stdout carries protocol frames only.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir,
        pokeapi_url: cli_args.pokeapi_url,
        pokeapi_timeout_sec: cli_args.pokeapi_timeout_sec,
        // Tools never issue tokens.
        jwt_secret: Some("unused".to_string()),
        ..Default::default()
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let db_path = config.db_path();
    info!("Opening SQLite database at {:?}...", db_path);
    let store = Arc::new(SqliteUserStore::new(&db_path)?);
    let lookup = Arc::new(PokeApiClient::new(&config.pokeapi.url, config.pokeapi.timeout)?);

    let context = ToolContext {
        user_manager: Arc::new(UserManager::new(store.clone())),
        catch_workflow: Arc::new(CatchWorkflow::new(
            lookup,
            store.clone(),
            Arc::new(ThreadRngSource),
        )),
        collection_manager: Arc::new(CollectionManager::new(store)),
        server_version: format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH")),
    };

    run_stdio(McpServer::new(context)).await
}
