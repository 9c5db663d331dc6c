//! Durable cross-session memory for conversational agents.
//!
//! This crate provides the memory store behind a conversation loop: every
//! user/assistant turn is written here, and later turns query it to resurface
//! relevant prior content. It uses SQLite for durability behind a single
//! coarse lock.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryStore                                                            │
//! │  - Single SQLite file with WAL mode                                     │
//! │  - memory_entries table scoped by user/session/agent                    │
//! │  - Keyword relevance search (LIKE prefilter + token scoring)            │
//! │  - Importance-based eviction keeps total count under a cap              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use mnemon_memory::{MemoryEntry, MemoryStore, SearchQuery};
//!
//! let store = MemoryStore::open("~/.mnemon/memory.db")?;
//!
//! // Store an entry
//! let entry = MemoryEntry::new("u1", "My favorite color is blue")
//!     .with_importance(0.9)
//!     .with_tag("fact");
//! store.insert(&entry)?;
//!
//! // Search for it later, from any session
//! let hits = store.search(&SearchQuery::new("u1", "favorite color").with_limit(5))?;
//! for hit in hits {
//!     println!("{} ({:.2})", hit.entry.content, hit.relevance);
//! }
//! # Ok::<(), mnemon_memory::MemoryError>(())
//! ```

pub mod config;
pub mod error;
pub mod relevance;
pub mod store;
pub mod types;
pub mod validation;

// Re-export config
pub use config::MemoryConfig;

// Re-export error types
pub use error::{MemoryError, Result};

// Re-export store and query types
pub use store::{ListFilter, MemoryStore, SearchHit, SearchQuery, StoreStats, UpdatePatch};

// Re-export entry types
pub use types::{EntryId, MemoryEntry, Metadata};

// Re-export validation
pub use validation::{validate_entry, ValidationError};
