use sea_orm::DbErr;
use thiserror::Error;

use super::record::RecordKind;

/// Errors raised by the storage context and the repository.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: RecordKind, id: i32 },

    #[error("persistence failure: {0}")]
    Persistence(#[from] DbErr),

    #[error("storage configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
