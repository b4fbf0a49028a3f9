//! Queue store error types.

use thiserror::Error;

/// Queue store error type.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying database could not be opened or migrated.
    /// Fatal for enqueue/list until the host environment resolves it.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A single write did not commit; the caller must not assume the
    /// message was queued.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Query error on an already-open store.
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Payload serialization error
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
