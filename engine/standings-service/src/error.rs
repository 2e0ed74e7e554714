//! Error types for the standings service

use hook::GameId;
use thiserror::Error;

/// Result type for standings operations
pub type Result<T> = std::result::Result<T, StandingsError>;

/// Errors that can occur while aggregating standings
#[derive(Error, Debug)]
pub enum StandingsError {
    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Invalid league rules: {0}")]
    Rules(#[from] hook::RulesError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<String> for StandingsError {
    fn from(err: String) -> Self {
        StandingsError::Store(err)
    }
}

impl From<&str> for StandingsError {
    fn from(err: &str) -> Self {
        StandingsError::Store(err.to_string())
    }
}
