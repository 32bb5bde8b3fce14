//! Repository error type.

use thiserror::Error;

/// Failure reported by a repository implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    /// Unique constraint violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Foreign key points at a missing row.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => RepositoryError::Conflict(db_err.message().to_string()),
                Some("23503") => RepositoryError::InvalidReference(db_err.message().to_string()),
                _ => RepositoryError::Database(err.to_string()),
            },
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}
