//! Error types for the stat engine

use thiserror::Error;

/// Result type for stat engine operations
pub type Result<T> = std::result::Result<T, StatEngineError>;

/// Errors that can occur while aggregating and scoring
#[derive(Error, Debug)]
pub enum StatEngineError {
    /// Both the narrow and the fallback broad record fetch failed.
    #[error("Order record source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Entity resolution failed: {0}")]
    Resolution(String),

    #[error("Trend lookup failed: {0}")]
    Trend(String),

    #[error("Stat store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for StatEngineError {
    fn from(err: String) -> Self {
        StatEngineError::Internal(err)
    }
}

impl From<&str> for StatEngineError {
    fn from(err: &str) -> Self {
        StatEngineError::Internal(err.to_string())
    }
}
