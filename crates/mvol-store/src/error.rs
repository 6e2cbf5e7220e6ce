//! Store error types.

use mvol_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Ranking file is missing categories: {}", missing.join(", "))]
    RankingsIncomplete { missing: Vec<String> },
}

pub type StoreResult<T> = Result<T, StoreError>;
