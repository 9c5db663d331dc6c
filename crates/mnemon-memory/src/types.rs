//! Entry types for the memory store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Open key-value metadata attached to an entry (role, message id, event
/// type, etc.). Schema-less and caller-defined; fields with real invariants
/// (importance, tags, timestamps) are typed on `MemoryEntry` itself.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Clamp an importance value to [0, 1].
///
/// NaN maps to 0.0: `f32::clamp` would propagate it, and SQLite stores a NaN
/// REAL as NULL, which would corrupt the row on read-back.
pub(crate) fn clamp_importance(importance: f32) -> f32 {
    if importance.is_nan() {
        0.0
    } else {
        importance.clamp(0.0, 1.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry ID
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a new random entry ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an entry ID from its string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Entry
// ─────────────────────────────────────────────────────────────────────────────

/// A single stored fact or utterance with owner, optional session/agent
/// scoping, importance, and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Unique ID, generated at creation, immutable.
    pub id: EntryId,
    /// Owner; every query scopes by this field.
    pub user_id: String,
    /// Optional grouping key for a single conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Optional identifier of the agent that produced/received the content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Free text content.
    pub content: String,
    /// Caller-defined metadata.
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    /// Short labels for coarse filtering (e.g. "user", "assistant").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Durability priority in [0, 1]; drives eviction order.
    pub importance: f32,
    /// Creation time, immutable.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl MemoryEntry {
    /// Create a new entry for the given user.
    ///
    /// Importance defaults to 1.0; timestamps are set to now.
    pub fn new(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            user_id: user_id.into(),
            session_id: None,
            agent_id: None,
            content: content.into(),
            metadata: Metadata::new(),
            tags: Vec::new(),
            importance: 1.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Tie this entry to a conversation session.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Tie this entry to an agent.
    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add several tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the importance, clamped to [0, 1]. NaN becomes 0.0.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = clamp_importance(importance);
        self
    }

    /// Set a metadata value.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
