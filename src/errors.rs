use crate::messages::limit_reached_message;
use crate::pokeapi::LookupError;

/// Failures surfaced by the catch and collection services.
#[derive(Debug, thiserror::Error)]
pub enum PokeError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("{0}")]
    NotFound(String),

    #[error("{}", limit_reached_message(*limit))]
    LimitReached { limit: usize },

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type PokeResult<T> = Result<T, PokeError>;
