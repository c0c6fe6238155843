use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a key-value backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The key is not stored. Callers treat this as a normal outcome.
    #[error("key not found: {0}")]
    NotFound(String),
    /// The medium itself failed (I/O error, corrupt container, poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the entity store.
///
/// Missing and undecodable records are not errors; they come back as `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error("corrupt next-id counter at {key}: {reason}")]
    CorruptCounter { key: String, reason: String },
    #[error("{namespace} record has no ID; create it before updating")]
    MissingId { namespace: &'static str },
    #[error("invalid key layout: {0}")]
    InvalidKeyLayout(String),
}
