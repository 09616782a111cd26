//! Test server lifecycle management
//!
//! Spawns the full application on a random port, backed by a temporary
//! database and the stub Pokémon lookup.

use super::constants::*;
use super::fixtures::{create_test_db_with_users, StubLookup};
use pokecatch_server::catch::FixedDraw;
use pokecatch_server::user::{JwtIssuer, SqliteUserStore};
use pokecatch_server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A running server instance, shut down when dropped.
///
/// # Example
///
/// ```ignore
/// let server = TestServer::spawn().await;
/// let response = reqwest::get(format!("{}/up", server.base_url)).await?;
/// ```
pub struct TestServer {
    /// Base URL for HTTP requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Port number the server is listening on
    #[allow(dead_code)]
    pub port: u16,

    /// Direct access to the store, for setup and assertions
    #[allow(dead_code)]
    pub user_store: Arc<SqliteUserStore>,

    /// Lookup backing the server, to count upstream calls
    #[allow(dead_code)]
    pub lookup: Arc<StubLookup>,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server whose catch attempts always succeed.
    pub async fn spawn() -> Self {
        Self::spawn_with_draw(0.0).await
    }

    /// Spawns a server where every catch roll draws `draw`.
    ///
    /// A draw of 1.0 makes every attempt flee.
    pub async fn spawn_with_draw(draw: f64) -> Self {
        Self::spawn_with_jwt_ttl(draw, Duration::from_secs(3600)).await
    }

    /// Spawns a server issuing API tokens with the given lifetime.
    pub async fn spawn_with_jwt_ttl(draw: f64, jwt_ttl: Duration) -> Self {
        let (temp_db_dir, db_path) =
            create_test_db_with_users().expect("Failed to create test database");
        let user_store =
            Arc::new(SqliteUserStore::new(&db_path).expect("Failed to open test database"));
        let lookup = Arc::new(StubLookup::default());

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: 0,
            metrics_port: 0,
        };

        let app = make_app(
            config,
            user_store.clone(),
            lookup.clone(),
            Arc::new(FixedDraw(draw)),
            JwtIssuer::new(TEST_JWT_SECRET, jwt_ttl),
        )
        .expect("Failed to build app");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server error");
        });

        let server = Self {
            base_url,
            port,
            user_store,
            lookup,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;
        server
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::new();
        let health_url = format!("{}/up", self.base_url);
        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            if let Ok(response) = client.get(&health_url).send().await {
                if response.status().is_success() {
                    return;
                }
            }

            tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
