use thiserror::Error;

use crate::infrastructure::persistence::error::DbError;

/// Error type for ledger flows composed by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// The flow refused to proceed; nothing was written
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl ServiceError {
    /// Store faults are retried on the next worker tick, refusals are not
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Db(e) => e.is_retryable(),
            ServiceError::Rejected(_) => false,
        }
    }
}

/// Failure reported by an event publisher
#[derive(Debug, Error)]
#[error("Publish failed: {0}")]
pub struct PublishError(pub String);
