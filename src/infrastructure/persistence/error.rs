// Error types for ledger persistence

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Error type for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup that must return a row found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write
    #[error("Constraint conflict: {0}")]
    Conflict(String),

    /// Error occurred during database connection attempt
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// Error from SeaORM
    #[error("Database query error: {0}")]
    QueryError(DbErr),

    /// The requested transition would break a ledger invariant
    #[error("Invariant violation: {0}")]
    Invariant(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }

    /// Store faults are worth another attempt on the next worker tick
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::ConnectionError(_) | DbError::QueryError(_))
    }
}

impl From<DbErr> for DbError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => DbError::Conflict(msg),
            _ => DbError::QueryError(err),
        }
    }
}
