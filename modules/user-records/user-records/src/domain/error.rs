use thiserror::Error;

use crate::infra::storage::StorageError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: i32 },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DomainError {
    pub(crate) fn nothing_written(kind: &'static str, id: i32) -> Self {
        Self::Persistence(format!("no {kind} row affected for id {id}"))
    }
}

impl From<StorageError> for DomainError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { kind, id } => Self::NotFound {
                kind: kind.name(),
                id,
            },
            StorageError::Persistence(db) => Self::Persistence(db.to_string()),
            StorageError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}
