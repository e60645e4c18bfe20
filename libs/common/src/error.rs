//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every repository.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A unique constraint rejected the write
    #[error("Duplicate record: {0}")]
    Conflict(String),

    /// A numeric column would leave its type's range
    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

/// SQLSTATE for `numeric_value_out_of_range`
const NUMERIC_OUT_OF_RANGE: &str = "22003";

impl DatabaseError {
    /// Classify a query failure, separating unique violations and numeric
    /// overflow from the rest
    pub fn from_query(err: SqlxError) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return DatabaseError::Conflict(db.message().to_string());
            }
            if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) {
                return DatabaseError::OutOfRange(db.message().to_string());
            }
        }
        DatabaseError::Query(err)
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
