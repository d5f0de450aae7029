//! Store error types.

use thiserror::Error;

/// Errors surfaced by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// A compare-and-swap write lost to a concurrent writer.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend is temporarily unavailable; safe to retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Conflict(_))
    }
}
