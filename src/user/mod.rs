pub mod auth;
pub mod jwt;
mod sqlite_user_store;
mod user_manager;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue};
pub use jwt::{Claims, JwtError, JwtIssuer};
pub use sqlite_user_store::SqliteUserStore;
pub use user_manager::UserManager;
pub use user_store::{FullUserStore, User, UserAuthTokenStore, UserStore};

/// Emails are stored and compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
