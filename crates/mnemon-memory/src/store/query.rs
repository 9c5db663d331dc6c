//! Query and result types for the memory store.

use crate::types::{MemoryEntry, Metadata};

// ─────────────────────────────────────────────────────────────────────────────
// Search Query
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for a relevance search.
///
/// An empty `query` string is a valid "match everything scoped" request:
/// every entry in scope is returned with relevance 1.0.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Owner scope; never matches entries of other users.
    pub user_id: String,
    /// Free-text query.
    pub query: String,
    /// Maximum number of hits to return.
    pub limit: usize,
    /// Minimum relevance threshold. When unset, the store's configured
    /// default applies.
    pub min_relevance: Option<f32>,
    /// Tag filter: a hit must carry at least one of these tags
    /// (empty = no tag filtering).
    pub tags: Vec<String>,
    /// Optional session scope.
    pub session_id: Option<String>,
    /// Optional agent scope.
    pub agent_id: Option<String>,
}

impl SearchQuery {
    /// Create a new search query.
    pub fn new(user_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            query: query.into(),
            limit: 10,
            min_relevance: None,
            tags: Vec::new(),
            session_id: None,
            agent_id: None,
        }
    }

    /// Set the maximum number of hits.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the minimum relevance threshold (clamped to [0, 1]).
    pub fn with_min_relevance(mut self, min: f32) -> Self {
        self.min_relevance = Some(min.clamp(0.0, 1.0));
        self
    }

    /// Require at least one of the hit's tags to match this tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Require at least one of the hit's tags to match one of these tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Restrict hits to a specific session.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Restrict hits to a specific agent.
    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search Results
// ─────────────────────────────────────────────────────────────────────────────

/// A single search hit: the entry plus its relevance for this query.
///
/// The relevance exists only on this wrapper, scoped to the search call that
/// produced it; it is never persisted.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matched entry.
    pub entry: MemoryEntry,
    /// Relevance to the query, in [0, 1].
    pub relevance: f32,
}

// ─────────────────────────────────────────────────────────────────────────────
// List Filter
// ─────────────────────────────────────────────────────────────────────────────

/// Optional narrowing for list operations.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Only entries from this session.
    pub session_id: Option<String>,
    /// Only entries from this agent.
    pub agent_id: Option<String>,
}

impl ListFilter {
    /// No narrowing; all of the user's entries.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a specific session.
    pub fn session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            agent_id: None,
        }
    }

    /// Restrict to a specific agent.
    pub fn agent(agent_id: impl Into<String>) -> Self {
        Self {
            session_id: None,
            agent_id: Some(agent_id.into()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update Patch
// ─────────────────────────────────────────────────────────────────────────────

/// A partial update to an existing entry.
///
/// Only the given fields change; `updated_at` is refreshed whenever any field
/// is present. An empty patch is a no-op.
#[derive(Debug, Clone, Default)]
pub struct UpdatePatch {
    /// New content.
    pub content: Option<String>,
    /// Replacement metadata map.
    pub metadata: Option<Metadata>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// New importance (clamped to [0, 1] on write).
    pub importance: Option<f32>,
}

impl UpdatePatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Replace the metadata map.
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Replace the tag list.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Set a new importance.
    pub fn importance(mut self, importance: f32) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.metadata.is_none()
            && self.tags.is_none()
            && self.importance.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stats
// ─────────────────────────────────────────────────────────────────────────────

/// Statistics about the memory store.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Total number of entries stored, across all users.
    pub entry_count: usize,
    /// Current schema version.
    pub schema_version: i32,
    /// Configured entry cap.
    pub max_entries: usize,
}
