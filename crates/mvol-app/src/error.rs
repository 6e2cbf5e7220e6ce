//! Application error types.
//!
//! User-facing operations fail with one of three kinds: `Validation` (bad
//! input, nothing written), `NotFound` / `RankingsUnavailable` (nothing
//! written), or an I/O failure from the stores.

use mvol_core::CoreError;
use mvol_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("One or more of the rankings lists are unavailable: {}", missing.join(", "))]
    RankingsUnavailable { missing: Vec<String> },

    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] mvol_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Whether the operation was rejected before touching either store.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::RankingsUnavailable { .. }
        )
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RankingsIncomplete { missing } => Self::RankingsUnavailable { missing },
            StoreError::Core(core) => core.into(),
            other => Self::Store(other),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err: AppError = StoreError::RankingsIncomplete {
            missing: vec!["CV Vacancy Rankings".to_string()],
        }
        .into();
        assert!(matches!(err, AppError::RankingsUnavailable { .. }));
        assert!(err.is_user_error());

        let err: AppError = StoreError::Core(CoreError::InvalidNumber("x".to_string())).into();
        assert!(matches!(err, AppError::Validation(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = StoreError::Io(io).into();
        assert!(matches!(err, AppError::Store(_)));
        assert!(!err.is_user_error());
    }
}
