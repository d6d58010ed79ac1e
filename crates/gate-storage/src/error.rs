//! Error types for gate-storage

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database URL is not set")]
    NotConfigured,

    #[error("{0}")]
    Connection(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// True when the database could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, StorageError::NotConfigured | StorageError::Connection(_))
    }
}
