//! Eviction and age-based cleanup.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::Result;

use super::MemoryStore;

impl MemoryStore {
    /// Evict entries over the configured capacity.
    ///
    /// Removes the surplus ordered by `(importance ASC, created_at ASC)`:
    /// least important and oldest first, until at or under the limit.
    /// Takes the connection directly so `insert` can run the sweep while
    /// still holding the store guard.
    pub(crate) fn evict_surplus(conn: &Connection, max_entries: usize) -> Result<usize> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM memory_entries", [], |row| {
            row.get(0)
        })?;

        let surplus = (count as usize).saturating_sub(max_entries);
        if surplus == 0 {
            return Ok(0);
        }

        let deleted = conn.execute(
            r#"
            DELETE FROM memory_entries
            WHERE id IN (
                SELECT id FROM memory_entries
                ORDER BY importance ASC, created_at ASC
                LIMIT ?1
            )
            "#,
            params![surplus as i64],
        )?;

        Ok(deleted)
    }

    /// Delete entries older than `max_age_days`.
    ///
    /// With `keep_important` set, entries at or above the configured
    /// protected importance survive regardless of age. Returns the number of
    /// entries deleted.
    pub fn cleanup(&self, max_age_days: i64, keep_important: bool) -> Result<usize> {
        let cutoff = (Utc::now() - Duration::days(max_age_days)).to_rfc3339();

        let conn = self.conn.lock().unwrap();

        let deleted = if keep_important {
            conn.execute(
                "DELETE FROM memory_entries WHERE created_at < ?1 AND importance < ?2",
                params![cutoff, self.config.protected_importance],
            )?
        } else {
            conn.execute(
                "DELETE FROM memory_entries WHERE created_at < ?1",
                params![cutoff],
            )?
        };

        if deleted > 0 {
            info!("Cleanup removed {} entries older than {} days", deleted, max_age_days);
        } else {
            debug!("Cleanup found nothing older than {} days", max_age_days);
        }

        Ok(deleted)
    }
}
