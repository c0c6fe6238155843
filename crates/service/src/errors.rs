use thiserror::Error;

use crate::storage::StoreError;

/// Business errors for Herd commands
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("mastodon api error: {0}")]
    Upstream(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) | ServiceError::Model(_) => 1001,
            ServiceError::Conflict(_) => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Unauthorized(_) => 1004,
            ServiceError::Hash(_) => 1101,
            ServiceError::Token(_) => 1102,
            ServiceError::Storage(_) => 1200,
            ServiceError::Upstream(_) => 1300,
            ServiceError::Internal(_) => 1500,
        }
    }
}
