//! Keyword relevance scoring between a query and stored content.
//!
//! Intentionally simple: no stemming, no embeddings. Token overlap plus a
//! bonus for an exact phrase match, clamped to [0, 1].

/// Bonus added when the whole query appears contiguously in the content.
pub const SUBSTRING_BONUS: f32 = 0.3;

/// Score how relevant `content` is to `query`.
///
/// Both strings are lower-cased and split on whitespace. The base score is
/// the fraction of query tokens that appear verbatim among the content
/// tokens; a contiguous match of the full query adds [`SUBSTRING_BONUS`].
/// The result is clamped to [0, 1].
///
/// An empty query scores 0.0; callers that want "match everything" semantics
/// handle that case before scoring.
pub fn score(query: &str, content: &str) -> f32 {
    let query_lower = query.to_lowercase();
    let query_tokens: Vec<&str> = query_lower.split_whitespace().collect();
    if query_tokens.is_empty() {
        return 0.0;
    }

    let content_lower = content.to_lowercase();
    let content_tokens: std::collections::HashSet<&str> =
        content_lower.split_whitespace().collect();

    let matches = query_tokens
        .iter()
        .filter(|t| content_tokens.contains(**t))
        .count();

    let base = matches as f32 / query_tokens.len().max(1) as f32;

    let bonus = if content_lower.contains(&query_lower) {
        SUBSTRING_BONUS
    } else {
        0.0
    };

    (base + bonus).min(1.0)
}
