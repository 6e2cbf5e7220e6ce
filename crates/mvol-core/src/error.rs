//! Error types for mvol-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("Invalid market name {name:?}: {reason}")]
    InvalidMarketName { name: String, reason: &'static str },

    #[error("Unknown metric: {0:?}")]
    UnknownMetric(String),

    #[error("Unknown ranking category: {0:?}")]
    UnknownCategory(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
