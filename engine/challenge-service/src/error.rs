//! Error types for the challenge service

use thiserror::Error;
use uuid::Uuid;

/// Result type for challenge service operations
pub type Result<T> = std::result::Result<T, ChallengeServiceError>;

/// Hard failures only. State conflicts (wrong phase, exhausted budget,
/// off-roster asset) are soft results, never errors.
#[derive(Error, Debug)]
pub enum ChallengeServiceError {
    #[error("Challenge not found: {0}")]
    ChallengeNotFound(Uuid),

    #[error("Challenge store error: {0}")]
    Store(String),

    #[error("Team score lookup failed: {0}")]
    ScoreSource(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for ChallengeServiceError {
    fn from(err: String) -> Self {
        ChallengeServiceError::Internal(err)
    }
}

impl From<&str> for ChallengeServiceError {
    fn from(err: &str) -> Self {
        ChallengeServiceError::Internal(err.to_string())
    }
}
