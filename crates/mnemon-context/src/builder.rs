//! Prompt-context assembly for the next LLM call.

use std::sync::Arc;

use tracing::{debug, warn};

use mnemon_memory::{ListFilter, MemoryEntry, MemoryStore, SearchQuery};
use mnemon_types::Message;

use crate::config::ContextConfig;

/// Closing instruction appended after the user message.
const CLOSING_INSTRUCTION: &str =
    "Answer the user message, drawing on the context above where it is relevant.";

/// Extra rows fetched in the store-fallback history so session start/end
/// markers don't occupy turn-budget slots.
const SESSION_MARKER_SLACK: usize = 2;

/// Assembles the bounded text preamble handed to the LLM on each turn.
///
/// Two sections feed the preamble, in fixed order to keep recency primacy:
/// the most recent in-session turns, then cross-session search hits for the
/// current message. When neither has content, the raw message passes through
/// unchanged.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    store: Arc<MemoryStore>,
    config: ContextConfig,
}

impl ContextBuilder {
    /// Create a builder over the given store.
    pub fn new(store: Arc<MemoryStore>, config: ContextConfig) -> Self {
        Self { store, config }
    }

    /// Build the context preamble for the next turn.
    ///
    /// `recent_turns` is the caller's in-session history, oldest first,
    /// excluding `current_message`. When the caller has no history in hand
    /// (e.g. a resumed session), recorded message entries for the session are
    /// pulled from the store instead.
    ///
    /// The output is advisory prose for an LLM prompt, not machine-parsed.
    pub fn build_context(
        &self,
        user_id: &str,
        session_id: &str,
        current_message: &str,
        recent_turns: &[Message],
    ) -> String {
        let history = self.session_history(user_id, session_id, recent_turns);
        let past = self.cross_session_context(user_id, current_message);

        if history.is_none() && past.is_none() {
            return current_message.to_string();
        }

        let mut sections = Vec::new();
        if let Some(history) = history {
            sections.push(format!("CURRENT SESSION HISTORY:\n{history}"));
        }
        if let Some(past) = past {
            sections.push(format!("RELEVANT PAST CONTEXT:\n{past}"));
        }

        format!(
            "CONVERSATION CONTEXT:\n\n{}\n\n---\n\nUSER MESSAGE: {}\n\n{}",
            sections.join("\n\n"),
            current_message,
            CLOSING_INSTRUCTION
        )
    }

    /// Render the immediate in-session history, newest turns last.
    fn session_history(
        &self,
        user_id: &str,
        session_id: &str,
        recent_turns: &[Message],
    ) -> Option<String> {
        if !recent_turns.is_empty() {
            let skip = recent_turns.len().saturating_sub(self.config.history_turns);
            let lines: Vec<String> = recent_turns[skip..]
                .iter()
                .map(|m| format!("{}: {}", m.role, m.content))
                .collect();
            return Some(lines.join("\n"));
        }

        // Fall back to recorded message entries for this session. Session
        // markers share the session, so fetch slack beyond the turn budget
        // and filter by tag before applying it.
        let entries = match self.store.list(
            user_id,
            &ListFilter::session(session_id),
            self.config.history_turns + SESSION_MARKER_SLACK,
            0,
        ) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Session history lookup failed, omitting section: {}", e);
                return None;
            }
        };

        // list() is newest-first: take the newest turns, then render
        // oldest-first.
        let mut turns: Vec<&MemoryEntry> = entries
            .iter()
            .filter(|e| e.tags.iter().any(|t| t == "message"))
            .take(self.config.history_turns)
            .collect();
        turns.reverse();

        if turns.is_empty() {
            return None;
        }
        let lines: Vec<String> = turns
            .iter()
            .map(|e| format!("{}: {}", entry_role(e), e.content))
            .collect();
        Some(lines.join("\n"))
    }

    /// Render cross-session hits for the current message. Not restricted to
    /// the current session: this is what resurfaces older conversations.
    fn cross_session_context(&self, user_id: &str, current_message: &str) -> Option<String> {
        // An empty message would match everything; there is nothing useful
        // to resurface for it.
        if current_message.trim().is_empty() {
            return None;
        }

        let query = SearchQuery::new(user_id, current_message)
            .with_limit(self.config.search_limit)
            .with_min_relevance(self.config.min_relevance);

        // A missing memory section is better than a broken turn: search
        // failures degrade to "no results".
        let hits = match self.store.search(&query) {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Cross-session search failed, omitting section: {}", e);
                return None;
            }
        };

        if hits.is_empty() {
            return None;
        }

        debug!(
            "Cross-session context: {} hits for user {}",
            hits.len(),
            user_id
        );

        let lines: Vec<String> = hits
            .iter()
            .take(self.config.context_hits)
            .map(|hit| format!("• {}", hit.entry.content))
            .collect();
        Some(lines.join("\n"))
    }
}

/// Role label for a recorded entry: the `"role"` metadata key when present,
/// otherwise the first tag.
fn entry_role(entry: &MemoryEntry) -> &str {
    entry
        .metadata
        .get("role")
        .and_then(|v| v.as_str())
        .or_else(|| entry.tags.first().map(String::as_str))
        .unwrap_or("user")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::TurnRecorder;
    use mnemon_types::Role;

    fn create_builder() -> (ContextBuilder, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::open_in_memory().unwrap());
        (
            ContextBuilder::new(store.clone(), ContextConfig::default()),
            store,
        )
    }

    #[test]
    fn test_passthrough_when_nothing_to_add() {
        let (builder, _store) = create_builder();

        let out = builder.build_context("u1", "s1", "hello there", &[]);
        assert_eq!(out, "hello there");
    }

    #[test]
    fn test_cross_session_section_present() {
        let (builder, store) = create_builder();

        store
            .insert(&MemoryEntry::new("u1", "My favorite color is blue").with_importance(0.9))
            .unwrap();

        let out = builder.build_context("u1", "s1", "what's my favorite color?", &[]);

        assert!(out.starts_with("CONVERSATION CONTEXT:"));
        assert!(out.contains("RELEVANT PAST CONTEXT:\n• My favorite color is blue"));
        assert!(out.contains("USER MESSAGE: what's my favorite color?"));
        // No history section leaked for an empty session
        assert!(!out.contains("CURRENT SESSION HISTORY:"));
    }

    #[test]
    fn test_history_section_from_caller_turns() {
        let (builder, _store) = create_builder();

        let turns = vec![Message::user("hi"), Message::assistant("hello")];
        let out = builder.build_context("u1", "s1", "next question", &turns);

        assert!(out.contains("CURRENT SESSION HISTORY:\nuser: hi\nassistant: hello"));
        assert!(out.contains("USER MESSAGE: next question"));
    }

    #[test]
    fn test_history_limited_to_last_turns() {
        let store = Arc::new(MemoryStore::open_in_memory().unwrap());
        let builder = ContextBuilder::new(
            store,
            ContextConfig::default().with_history_turns(2),
        );

        let turns: Vec<Message> = (0..6)
            .map(|i| Message::user(format!("turn {i}")))
            .collect();
        let out = builder.build_context("u1", "s1", "latest", &turns);

        assert!(out.contains("user: turn 4\nuser: turn 5"));
        assert!(!out.contains("turn 3"));
    }

    #[test]
    fn test_history_falls_back_to_store() {
        let (builder, store) = create_builder();
        let recorder = TurnRecorder::new(store.clone());

        recorder.record_session_start("u1", "s1").unwrap();
        recorder
            .record_turn("u1", "s1", Role::User, "hi", None)
            .unwrap();
        recorder
            .record_turn("u1", "s1", Role::Assistant, "hello", None)
            .unwrap();

        let out = builder.build_context("u1", "s1", "zzz no match", &[]);

        // Session markers are filtered out; only turns remain, oldest first
        assert!(out.contains("CURRENT SESSION HISTORY:\nuser: hi\nassistant: hello"));
        assert!(!out.contains("session started"));
    }

    #[test]
    fn test_history_fallback_markers_dont_eat_turn_budget() {
        let store = Arc::new(MemoryStore::open_in_memory().unwrap());
        let builder = ContextBuilder::new(
            store.clone(),
            ContextConfig::default().with_history_turns(3),
        );
        let recorder = TurnRecorder::new(store);

        recorder.record_session_start("u1", "s1").unwrap();
        recorder
            .record_turn("u1", "s1", Role::User, "first", None)
            .unwrap();
        recorder
            .record_turn("u1", "s1", Role::Assistant, "second", None)
            .unwrap();
        recorder
            .record_turn("u1", "s1", Role::User, "third", None)
            .unwrap();
        recorder
            .record_session_end("u1", "s1", "wrap-up summary")
            .unwrap();

        let out = builder.build_context("u1", "s1", "zzz", &[]);

        // The end marker is the newest session entry; the full turn budget
        // must still be filled from actual turns.
        assert!(out.contains(
            "CURRENT SESSION HISTORY:\nuser: first\nassistant: second\nuser: third"
        ));
        assert!(!out.contains("wrap-up summary"));
        assert!(!out.contains("session started"));
    }

    #[test]
    fn test_both_sections_in_fixed_order() {
        let (builder, store) = create_builder();

        store
            .insert(&MemoryEntry::new("u1", "favorite color is blue"))
            .unwrap();

        let turns = vec![Message::user("hi")];
        let out = builder.build_context("u1", "s1", "favorite color?", &turns);

        let history_pos = out.find("CURRENT SESSION HISTORY:").unwrap();
        let past_pos = out.find("RELEVANT PAST CONTEXT:").unwrap();
        let message_pos = out.find("USER MESSAGE:").unwrap();
        assert!(history_pos < past_pos);
        assert!(past_pos < message_pos);
        assert!(out.contains("---"));
    }

    #[test]
    fn test_top_hits_capped() {
        let store = Arc::new(MemoryStore::open_in_memory().unwrap());
        let builder = ContextBuilder::new(
            store.clone(),
            ContextConfig::default().with_context_hits(3),
        );

        for i in 0..5 {
            store
                .insert(&MemoryEntry::new("u1", format!("blue fact number {i}")))
                .unwrap();
        }

        let out = builder.build_context("u1", "s1", "blue", &[]);
        assert_eq!(out.matches('•').count(), 3);
    }

    #[test]
    fn test_empty_message_skips_cross_session_lookup() {
        let (builder, store) = create_builder();

        store
            .insert(&MemoryEntry::new("u1", "should not surface"))
            .unwrap();

        let out = builder.build_context("u1", "s1", "", &[]);
        assert_eq!(out, "");
    }

    #[test]
    fn test_low_relevance_hits_excluded() {
        let (builder, store) = create_builder();

        store
            .insert(&MemoryEntry::new("u1", "nothing in common at all"))
            .unwrap();

        let out = builder.build_context("u1", "s1", "favorite color?", &[]);
        assert_eq!(out, "favorite color?");
    }
}
