//! Configuration for context assembly.

/// Default number of in-session turns included verbatim.
pub const DEFAULT_HISTORY_TURNS: usize = 5;

/// Default number of candidates fetched from cross-session search.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Default number of cross-session hits rendered into the context.
pub const DEFAULT_CONTEXT_HITS: usize = 3;

/// Default minimum relevance for cross-session hits.
pub const DEFAULT_MIN_RELEVANCE: f32 = 0.2;

/// Configuration for a [`ContextBuilder`](crate::ContextBuilder).
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// How many of the most recent in-session turns to include.
    pub history_turns: usize,

    /// How many candidates to fetch from cross-session search.
    pub search_limit: usize,

    /// How many of the top-ranked hits to render into the context.
    pub context_hits: usize,

    /// Minimum relevance for cross-session hits.
    pub min_relevance: f32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_turns: DEFAULT_HISTORY_TURNS,
            search_limit: DEFAULT_SEARCH_LIMIT,
            context_hits: DEFAULT_CONTEXT_HITS,
            min_relevance: DEFAULT_MIN_RELEVANCE,
        }
    }
}

impl ContextConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many recent in-session turns to include.
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Set how many candidates to fetch from cross-session search.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set how many top hits to render.
    pub fn with_context_hits(mut self, hits: usize) -> Self {
        self.context_hits = hits;
        self
    }

    /// Set the minimum relevance for cross-session hits (clamped to [0, 1]).
    pub fn with_min_relevance(mut self, min: f32) -> Self {
        self.min_relevance = min.clamp(0.0, 1.0);
        self
    }
}
