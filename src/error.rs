use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Stable error kinds surfaced to callers. Lookup misses are `NotFound`,
/// uniqueness-constraint violations are `Conflict` (benign idempotency
/// for additive operations, the caller decides), malformed input is
/// `InvalidArgument`, store connectivity failures are `Unavailable`.
/// No operation retries automatically; retry policy belongs to the
/// transport layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Store Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            return AppError::Conflict(msg);
        }
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => AppError::Unavailable(err.to_string()),
            other => AppError::Database(other),
        }
    }
}

impl AppError {
    /// True when the error is a uniqueness-constraint conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}
