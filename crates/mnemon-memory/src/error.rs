//! Error types for the memory crate.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur in the memory crate.
///
/// "Not found" is deliberately not represented here: `get` returns `None` and
/// `update`/`delete` return `false` for absent entries, so callers distinguish
/// normal misses from durability failures by type.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The durability layer failed (I/O error, corruption, lock timeout).
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Serialization/deserialization of metadata or tags failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller passed an out-of-range or missing required value.
    /// Rejected before any write; no partial state change.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid UUID format.
    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    /// Invalid data read back from the store.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
