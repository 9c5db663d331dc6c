//! Relevance search over memory entries.

use tracing::debug;

use crate::error::Result;
use crate::relevance;

use super::entry_ops::ENTRY_COLUMNS;
use super::{MemoryStore, SearchHit, SearchQuery};

impl MemoryStore {
    /// Search a user's entries by keyword relevance.
    ///
    /// Candidates are narrowed in SQL (scope filters plus, for ASCII
    /// queries, a LIKE prefilter that is a strict superset of what the
    /// scorer can match), then scored in Rust. Hits below the minimum
    /// relevance are dropped; the rest are ordered by relevance, then
    /// importance, then recency, and truncated to the query limit.
    ///
    /// An empty query matches every entry in scope with relevance 1.0.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let min_relevance = query
            .min_relevance
            .unwrap_or(self.config.min_relevance);

        let query_lower = query.query.to_lowercase();
        let tokens: Vec<&str> = query_lower.split_whitespace().collect();
        let match_everything = tokens.is_empty();

        let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM memory_entries WHERE user_id = ?");
        let mut values: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(query.user_id.clone())];

        if let Some(session_id) = &query.session_id {
            sql.push_str(" AND session_id = ?");
            values.push(Box::new(session_id.clone()));
        }
        if let Some(agent_id) = &query.agent_id {
            sql.push_str(" AND agent_id = ?");
            values.push(Box::new(agent_id.clone()));
        }

        // The prefilter must stay a superset of what the scorer can pass.
        // At min_relevance 0.0 the scorer accepts every scoped row, and LIKE
        // is only case-insensitive for ASCII in SQLite, so both cases skip
        // the prefilter and let the scorer see every scoped row.
        if !match_everything && min_relevance > 0.0 && query.query.is_ascii() {
            let mut likes = vec!["content LIKE ?".to_string()];
            values.push(Box::new(format!("%{}%", query.query)));
            for token in &tokens {
                likes.push("content LIKE ?".to_string());
                values.push(Box::new(format!("%{token}%")));
            }
            sql.push_str(&format!(" AND ({})", likes.join(" OR ")));
        }

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|b| b.as_ref()).collect();
        let mut rows = stmt.query(params_refs.as_slice())?;

        let mut hits = Vec::new();
        while let Some(row) = rows.next()? {
            let entry = Self::row_to_entry(row)?;

            // Tag filter: at least one requested tag must be present
            if !query.tags.is_empty() && !query.tags.iter().any(|t| entry.tags.contains(t)) {
                continue;
            }

            let score = if match_everything {
                1.0
            } else {
                relevance::score(&query.query, &entry.content)
            };

            if score >= min_relevance {
                hits.push(SearchHit {
                    entry,
                    relevance: score,
                });
            }
        }
        drop(rows);
        drop(stmt);
        drop(conn);

        // Relevance first, then importance, then recency
        hits.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.entry
                        .importance
                        .partial_cmp(&a.entry.importance)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| b.entry.created_at.cmp(&a.entry.created_at))
        });
        hits.truncate(query.limit);

        debug!(
            "Search for user {} returned {} hits",
            query.user_id,
            hits.len()
        );

        Ok(hits)
    }
}
