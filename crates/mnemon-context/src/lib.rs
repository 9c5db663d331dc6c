//! Conversation-side consumers of the memory store.
//!
//! Two collaborators sit between a conversation loop and
//! [`mnemon_memory::MemoryStore`]:
//!
//! - [`TurnRecorder`] writes every user/assistant turn into the store before
//!   the turn is considered sent. Memory is best-effort auxiliary state: a
//!   failed write is logged and the conversation continues.
//! - [`ContextBuilder`] assembles the bounded text preamble handed to the
//!   LLM on each turn, combining recent in-session history with
//!   cross-session search hits.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mnemon_context::{ContextBuilder, ContextConfig, TurnRecorder};
//! use mnemon_memory::MemoryStore;
//! use mnemon_types::Role;
//!
//! let store = Arc::new(MemoryStore::open_in_memory()?);
//! let recorder = TurnRecorder::new(store.clone());
//! let builder = ContextBuilder::new(store, ContextConfig::default());
//!
//! recorder.record_turn("u1", "s1", Role::User, "hi", None);
//! let context = builder.build_context("u1", "s1", "what's my favorite color?", &[]);
//! # Ok::<(), mnemon_memory::MemoryError>(())
//! ```

pub mod builder;
pub mod config;
pub mod recorder;

pub use builder::ContextBuilder;
pub use config::ContextConfig;
pub use recorder::TurnRecorder;
