use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::State, middleware, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use tracing::{error, info};

use super::{
    api::make_api_routes, log_requests, metrics::metrics_handler, state::ServerState,
    web::make_web_routes, ServerConfig,
};
use crate::catch::{CatchWorkflow, RandomSource};
use crate::collection::CollectionManager;
use crate::pokeapi::PokemonLookup;
use crate::user::{FullUserStore, JwtIssuer, UserManager};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn status(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    })
}

impl ServerState {
    fn new(
        config: ServerConfig,
        user_store: Arc<dyn FullUserStore>,
        lookup: Arc<dyn PokemonLookup>,
        random: Arc<dyn RandomSource>,
        jwt_issuer: JwtIssuer,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            user_manager: Arc::new(UserManager::new(user_store.clone())),
            catch_workflow: Arc::new(CatchWorkflow::new(lookup, user_store.clone(), random)),
            collection_manager: Arc::new(CollectionManager::new(user_store)),
            jwt_issuer: Arc::new(jwt_issuer),
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    user_store: Arc<dyn FullUserStore>,
    lookup: Arc<dyn PokemonLookup>,
    random: Arc<dyn RandomSource>,
    jwt_issuer: JwtIssuer,
) -> Result<Router> {
    let state = ServerState::new(config, user_store, lookup, random, jwt_issuer);

    let status_routes: Router = Router::new()
        .route("/status", get(status))
        .with_state(state.clone());

    let app: Router = make_web_routes(state.clone())
        .merge(status_routes)
        .nest("/api", make_api_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    user_store: Arc<dyn FullUserStore>,
    lookup: Arc<dyn PokemonLookup>,
    random: Arc<dyn RandomSource>,
    jwt_issuer: JwtIssuer,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, user_store, lookup, random, jwt_issuer)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", e);
        }
    });
    info!("Serving metrics on port {}", metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
