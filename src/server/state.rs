use axum::extract::FromRef;

use crate::catch::CatchWorkflow;
use crate::collection::CollectionManager;
use crate::user::{JwtIssuer, UserManager};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedCatchWorkflow = Arc<CatchWorkflow>;
pub type GuardedCollectionManager = Arc<CollectionManager>;
pub type GuardedJwtIssuer = Arc<JwtIssuer>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_manager: GuardedUserManager,
    pub catch_workflow: GuardedCatchWorkflow,
    pub collection_manager: GuardedCollectionManager,
    pub jwt_issuer: GuardedJwtIssuer,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedCatchWorkflow {
    fn from_ref(input: &ServerState) -> Self {
        input.catch_workflow.clone()
    }
}

impl FromRef<ServerState> for GuardedCollectionManager {
    fn from_ref(input: &ServerState) -> Self {
        input.collection_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedJwtIssuer {
    fn from_ref(input: &ServerState) -> Self {
        input.jwt_issuer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
