use crate::forms::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} {id} still has {dependents} show(s) booked")]
    HasDependents {
        entity: &'static str,
        id: i64,
        dependents: i64,
    },

    #[error("Database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage session unavailable: {0}")]
    Session(String),
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StorageError::NotFound { entity, id }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
