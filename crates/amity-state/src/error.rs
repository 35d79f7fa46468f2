//! Error types for the storage layer

use amity_core::AmityError;
use thiserror::Error;

/// Errors that can occur in storage operations
#[derive(Error, Debug)]
pub enum StateError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Duplicate entry
    #[error("Duplicate {entity}: {id}")]
    Duplicate { entity: String, id: String },

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),
}

impl StateError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StateError::Duplicate { .. })
    }
}

impl From<sqlx::Error> for StateError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StateError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                if db_err.message().contains("UNIQUE constraint") {
                    StateError::Duplicate {
                        entity: "record".to_string(),
                        id: db_err.message().to_string(),
                    }
                } else {
                    StateError::Database(db_err.to_string())
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StateError::Connection(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StateError::InvalidData(err.to_string())
            }
            _ => StateError::Database(err.to_string()),
        }
    }
}

impl From<StateError> for AmityError {
    fn from(err: StateError) -> Self {
        AmityError::Storage(err.to_string())
    }
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StateError>;
