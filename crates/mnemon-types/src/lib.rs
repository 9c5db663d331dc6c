//! Shared types for the mnemon memory system.

pub mod message;

pub use message::{Message, Role};

/// Opaque identifier used across the system (uuid v4 rendered as a string).
pub type Id = String;

/// Timestamp type used across the system.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new unique identifier.
pub fn new_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

/// Current UTC time.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
