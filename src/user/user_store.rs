use super::auth::{AuthToken, AuthTokenValue};
use crate::collection::CollectionStore;
use anyhow::Result;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: usize,
    pub email: String,
}

pub trait UserAuthTokenStore: Send + Sync {
    /// Returns a user's authentication token given an AuthTokenValue.
    /// Returns Ok(None) if the token does not exist.
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes an auth token given the token value.
    /// Returns Ok(None) if the token does not exist.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Updates an auth token with the latest timestamp.
    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()>;
}

pub trait UserStore: UserAuthTokenStore + Send + Sync {
    /// Creates a new user and returns the user id.
    fn create_user(&self, email: &str) -> Result<usize>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    /// Returns the id of the user with the given email.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_id(&self, email: &str) -> Result<Option<usize>>;

    /// Returns all users ordered by id.
    fn get_all_users(&self) -> Result<Vec<User>>;

    /// Deletes the user together with their tokens and collection.
    /// Returns Ok(false) if the user did not exist.
    fn delete_user(&self, user_id: usize) -> Result<bool>;
}

/// Everything the services need from persistence.
pub trait FullUserStore: UserStore + CollectionStore {}

impl<T: UserStore + CollectionStore> FullUserStore for T {}
