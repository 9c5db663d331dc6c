//! Configuration for the memory store.
//!
//! All tuning thresholds live here so call sites don't scatter their own
//! copies of the same constants.

/// Default soft bound on total entry count before eviction kicks in.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default minimum relevance for search results.
pub const DEFAULT_MIN_RELEVANCE: f32 = 0.2;

/// Entries at or above this importance are exempt from age-based cleanup
/// when `keep_important` is set.
pub const DEFAULT_PROTECTED_IMPORTANCE: f32 = 0.8;

/// Configuration for a [`MemoryStore`](crate::MemoryStore) instance.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Soft bound on total entry count. Exceeding it after an insert evicts
    /// the lowest `(importance, created_at)` entries until back under.
    pub max_entries: usize,

    /// Default minimum relevance applied when a search query doesn't set one.
    pub min_relevance: f32,

    /// Importance threshold above which cleanup leaves entries alone
    /// (when asked to keep important entries).
    pub protected_importance: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            min_relevance: DEFAULT_MIN_RELEVANCE,
            protected_importance: DEFAULT_PROTECTED_IMPORTANCE,
        }
    }
}

impl MemoryConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the soft bound on total entry count.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Set the default minimum relevance (clamped to [0, 1]).
    pub fn with_min_relevance(mut self, min: f32) -> Self {
        self.min_relevance = min.clamp(0.0, 1.0);
        self
    }

    /// Set the importance threshold that shields entries from cleanup
    /// (clamped to [0, 1]).
    pub fn with_protected_importance(mut self, importance: f32) -> Self {
        self.protected_importance = importance.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MemoryConfig::default();
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(config.min_relevance, DEFAULT_MIN_RELEVANCE);
        assert_eq!(config.protected_importance, DEFAULT_PROTECTED_IMPORTANCE);
    }

    #[test]
    fn test_builders_clamp() {
        let config = MemoryConfig::new()
            .with_max_entries(2)
            .with_min_relevance(1.5)
            .with_protected_importance(-0.1);
        assert_eq!(config.max_entries, 2);
        assert_eq!(config.min_relevance, 1.0);
        assert_eq!(config.protected_importance, 0.0);
    }
}
