use std::sync::Arc;

use crate::catch::CatchWorkflow;
use crate::collection::CollectionManager;
use crate::user::{User, UserManager};

use super::protocol::McpError;

/// Services available to tool and resource handlers.
#[derive(Clone)]
pub struct ToolContext {
    pub user_manager: Arc<UserManager>,
    pub catch_workflow: Arc<CatchWorkflow>,
    pub collection_manager: Arc<CollectionManager>,
    pub server_version: String,
}

impl ToolContext {
    /// Tools identify the acting user by email rather than by session.
    pub fn find_user(&self, email: &str) -> Result<Option<User>, McpError> {
        self.user_manager
            .find_user_by_email(email)
            .map_err(|e| McpError::InternalError(e.to_string()))
    }
}
