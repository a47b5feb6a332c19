//! Store error types.

use domain::OrderError;
use thiserror::Error;

/// Errors that can occur when interacting with a commerce store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule was violated; the enclosing transaction rolled back.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be interpreted.
    #[error("Invalid value in column {column}: {value}")]
    Decode { column: &'static str, value: String },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
