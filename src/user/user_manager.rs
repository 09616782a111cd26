use super::{normalize_email, AuthToken, AuthTokenValue, FullUserStore, User};
use anyhow::{bail, Result};
use std::{sync::Arc, time::SystemTime};
use tracing::info;

/// Accounts provisioned by `seed`.
pub const DEMO_USER_EMAILS: &[&str] = &[
    "demo@example.com",
    "ash.ketchum@pokemon.com",
    "misty.waterflower@cerulean.gym",
    "brock.harrison@pewter.gym",
    "gary.oak@pallet.town",
    "jessie.team@rocket.org",
    "james.team@rocket.org",
    "nurse.joy@pokecenter.com",
    "officer.jenny@police.kanto",
    "professor.oak@research.lab",
    "may.hoenn@coordinator.net",
    "dawn.sinnoh@contests.com",
];

pub struct UserManager {
    user_store: Arc<dyn FullUserStore>,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn FullUserStore>) -> Self {
        Self { user_store }
    }

    pub fn add_user(&self, email: &str) -> Result<usize> {
        let email = normalize_email(email);
        if email.is_empty() {
            bail!("The email cannot be empty.");
        }
        if !email.contains('@') {
            bail!("'{}' is not a valid email.", email);
        }
        if self.user_store.get_user_id(&email)?.is_some() {
            bail!("User {} already exists.", email);
        }
        let id = self.user_store.create_user(&email)?;
        info!("Created user {} with id {}", email, id);
        Ok(id)
    }

    /// Creates the demo accounts that are missing. Returns the emails actually created.
    pub fn seed_demo_users(&self) -> Result<Vec<String>> {
        let mut created = vec![];
        for email in DEMO_USER_EMAILS {
            if self.user_store.get_user_id(email)?.is_none() {
                self.user_store.create_user(email)?;
                created.push(email.to_string());
            }
        }
        Ok(created)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.user_store.get_user_id(email)? {
            Some(id) => self.user_store.get_user(id),
            None => Ok(None),
        }
    }

    pub fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        self.user_store.get_user(user_id)
    }

    pub fn get_all_users(&self) -> Result<Vec<User>> {
        self.user_store.get_all_users()
    }

    pub fn generate_auth_token(&self, user_id: usize) -> Result<AuthToken> {
        let token = AuthToken {
            user_id,
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        };
        self.user_store.add_user_auth_token(token.clone())?;
        Ok(token)
    }

    /// Resolves a session token, refreshing its last-used timestamp.
    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let token = self.user_store.get_user_auth_token(value)?;
        if token.is_some() {
            self.user_store
                .update_user_auth_token_last_used_timestamp(value)?;
        }
        Ok(token)
    }

    pub fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        self.user_store.delete_user_auth_token(value)
    }
}
