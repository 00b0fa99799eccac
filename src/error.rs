//! Error taxonomy shared by the service and the HTTP transport.

use crate::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MovieError {
    /// Input failed validation or type coercion.
    #[error("{0}")]
    Validation(String),

    /// The identifier is not a well-formed movie id.
    #[error("Invalid movie id: {0}")]
    InvalidId(String),

    #[error("Movie not found")]
    NotFound,

    /// The storage backend could not be reached.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for MovieError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => MovieError::StorageUnavailable(msg),
            StoreError::Backend(msg) => MovieError::Internal(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, MovieError>;
