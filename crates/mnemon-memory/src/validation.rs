//! Validation for entries arriving at the store.
//!
//! All checks here run before any write touches the database, so a rejected
//! entry leaves no partial state behind.

use crate::types::MemoryEntry;

/// Specific validation error types for memory entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Every entry must belong to a user; all queries scope by this field.
    #[error("user_id is empty")]
    EmptyUserId,

    /// Entry content is empty.
    #[error("entry content is empty")]
    EmptyContent,

    /// Entry content contains a null byte (likely binary data).
    #[error("entry content contains a null byte")]
    NullByteContent,
}

/// Validate an entry before it is written.
///
/// Checks:
/// 1. `user_id` is non-empty
/// 2. `content` is non-empty and free of null bytes
///
/// Importance is not validated here: out-of-range values are clamped on
/// write rather than rejected.
pub fn validate_entry(entry: &MemoryEntry) -> std::result::Result<(), ValidationError> {
    if entry.user_id.is_empty() {
        return Err(ValidationError::EmptyUserId);
    }
    if entry.content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if entry.content.contains('\0') {
        return Err(ValidationError::NullByteContent);
    }
    Ok(())
}
