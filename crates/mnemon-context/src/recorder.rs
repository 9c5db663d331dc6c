//! Write-through recording of conversation turns.

use std::sync::Arc;

use tracing::{debug, warn};

use mnemon_memory::{EntryId, MemoryEntry, MemoryStore, Metadata};
use mnemon_types::Role;

/// Base importance for user turns.
const USER_IMPORTANCE: f32 = 0.8;

/// Base importance for assistant turns.
const ASSISTANT_IMPORTANCE: f32 = 0.6;

/// Base importance for system/tool turns.
const OTHER_IMPORTANCE: f32 = 0.5;

/// Content longer than this earns an importance bonus.
const LONG_CONTENT_THRESHOLD: usize = 200;

/// Importance bonus for long content.
const LONG_CONTENT_BONUS: f32 = 0.1;

/// Fixed importance for session-start marker entries.
const SESSION_START_IMPORTANCE: f32 = 0.8;

/// Fixed importance for session-end summary entries.
const SESSION_END_IMPORTANCE: f32 = 0.6;

/// Records conversation turns into the memory store as they occur.
///
/// Every write completes synchronously before the turn is considered sent.
/// The store is not the system of record for the transcript itself, so a
/// failed write never blocks the conversation: it is logged and the turn
/// proceeds without a memory entry.
#[derive(Debug, Clone)]
pub struct TurnRecorder {
    store: Arc<MemoryStore>,
}

impl TurnRecorder {
    /// Create a recorder over the given store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Record a single conversation turn.
    ///
    /// Tags the entry with the role name plus `"message"` and
    /// `"conversation"`, and stores the role under the `"role"` metadata key
    /// so recall can render it. Returns `None` if the write failed.
    pub fn record_turn(
        &self,
        user_id: &str,
        session_id: &str,
        role: Role,
        content: &str,
        metadata: Option<Metadata>,
    ) -> Option<EntryId> {
        let mut entry = MemoryEntry::new(user_id, content)
            .with_session(session_id)
            .with_tags([role.as_str(), "message", "conversation"])
            .with_importance(turn_importance(role, content))
            .with_metadata("role", serde_json::json!(role.as_str()));

        if let Some(extra) = metadata {
            entry.metadata.extend(extra);
        }

        self.try_insert(entry, "turn")
    }

    /// Record a marker entry for a newly started session.
    pub fn record_session_start(&self, user_id: &str, session_id: &str) -> Option<EntryId> {
        let entry = MemoryEntry::new(user_id, "New conversation session started")
            .with_session(session_id)
            .with_tags(["session", "start"])
            .with_importance(SESSION_START_IMPORTANCE);

        self.try_insert(entry, "session start")
    }

    /// Record a closing summary for a finished session.
    pub fn record_session_end(
        &self,
        user_id: &str,
        session_id: &str,
        summary: &str,
    ) -> Option<EntryId> {
        let entry = MemoryEntry::new(user_id, summary)
            .with_session(session_id)
            .with_tag("conversation")
            .with_importance(SESSION_END_IMPORTANCE)
            .with_metadata("type", serde_json::json!("conversation_end"));

        self.try_insert(entry, "session end")
    }

    /// Insert with best-effort semantics: log and swallow failures.
    fn try_insert(&self, entry: MemoryEntry, kind: &str) -> Option<EntryId> {
        let id = entry.id;
        match self.store.insert(&entry) {
            Ok(()) => {
                debug!("Recorded {} as entry {}", kind, id);
                Some(id)
            }
            Err(e) => {
                warn!("Failed to record {} in memory (continuing): {}", kind, e);
                None
            }
        }
    }
}

/// Importance policy for a turn: role base plus a bonus for long content,
/// capped at 1.0.
fn turn_importance(role: Role, content: &str) -> f32 {
    let base = match role {
        Role::User => USER_IMPORTANCE,
        Role::Assistant => ASSISTANT_IMPORTANCE,
        Role::System | Role::Tool => OTHER_IMPORTANCE,
    };

    let bonus = if content.len() > LONG_CONTENT_THRESHOLD {
        LONG_CONTENT_BONUS
    } else {
        0.0
    };

    (base + bonus).min(1.0)
}
