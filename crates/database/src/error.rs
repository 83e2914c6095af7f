//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The connection URL names a backend this crate does not support.
    #[error("unsupported database url scheme: {0}")]
    UnsupportedUrl(String),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The driver did not report the id of an inserted row.
    #[error("insert into {0} returned no id")]
    MissingInsertId(&'static str),

    /// Stored content could not be encoded or decoded.
    #[error("content encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
