//! Entry CRUD operations.

use chrono::{DateTime, Utc};
use rusqlite::params;
use tracing::debug;

use crate::error::{MemoryError, Result};
use crate::types::{clamp_importance, EntryId, MemoryEntry, Metadata};
use crate::validation::validate_entry;

use super::{ListFilter, MemoryStore, UpdatePatch};

/// Column list shared by every SELECT that maps to a full entry.
pub(crate) const ENTRY_COLUMNS: &str =
    "id, user_id, session_id, agent_id, content, metadata, tags, importance, created_at, updated_at";

impl MemoryStore {
    /// Insert a new entry.
    ///
    /// Validates the entry, clamps importance to [0, 1], persists
    /// synchronously, then runs the eviction sweep while still holding the
    /// connection guard. A storage failure propagates without retry.
    pub fn insert(&self, entry: &MemoryEntry) -> Result<()> {
        validate_entry(entry)?;

        let metadata_json = serde_json::to_string(&entry.metadata)?;
        let tags_json = serde_json::to_string(&entry.tags)?;

        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO memory_entries (id, user_id, session_id, agent_id, content,
                                        metadata, tags, importance, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                entry.id.to_string(),
                entry.user_id,
                entry.session_id,
                entry.agent_id,
                entry.content,
                metadata_json,
                tags_json,
                clamp_importance(entry.importance),
                entry.created_at.to_rfc3339(),
                entry.updated_at.to_rfc3339(),
            ],
        )?;

        debug!("Inserted entry {}", entry.id);

        // Same guard acquisition as the insert: concurrent inserts can't
        // both see "under capacity" and skip the sweep.
        let evicted = Self::evict_surplus(&conn, self.config.max_entries)?;
        if evicted > 0 {
            debug!("Evicted {} entries over capacity", evicted);
        }

        Ok(())
    }

    /// Get an entry by ID. Absent entries are a normal outcome, not an error.
    pub fn get(&self, id: EntryId) -> Result<Option<MemoryEntry>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM memory_entries WHERE id = ?1"
        ))?;

        let mut rows = stmt.query(params![id.to_string()])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_entry(row)?))
        } else {
            Ok(None)
        }
    }

    /// Apply a partial update to an entry.
    ///
    /// Returns `false` for an empty patch or an absent entry. All given
    /// fields plus `updated_at` are written in a single UPDATE, so a failure
    /// leaves the prior row unchanged.
    pub fn update(&self, id: EntryId, patch: &UpdatePatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(content) = &patch.content {
            sets.push("content = ?");
            values.push(Box::new(content.clone()));
        }
        if let Some(metadata) = &patch.metadata {
            sets.push("metadata = ?");
            values.push(Box::new(serde_json::to_string(metadata)?));
        }
        if let Some(tags) = &patch.tags {
            sets.push("tags = ?");
            values.push(Box::new(serde_json::to_string(tags)?));
        }
        if let Some(importance) = patch.importance {
            sets.push("importance = ?");
            values.push(Box::new(clamp_importance(importance)));
        }
        sets.push("updated_at = ?");
        values.push(Box::new(Utc::now().to_rfc3339()));
        values.push(Box::new(id.to_string()));

        let sql = format!(
            "UPDATE memory_entries SET {} WHERE id = ?",
            sets.join(", ")
        );

        let conn = self.conn.lock().unwrap();
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|b| b.as_ref()).collect();
        let rows_affected = conn.execute(&sql, params_refs.as_slice())?;

        if rows_affected > 0 {
            debug!("Updated entry {}", id);
        }

        Ok(rows_affected > 0)
    }

    /// Delete an entry by ID. Idempotent; `false` if already absent.
    pub fn delete(&self, id: EntryId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn.execute(
            "DELETE FROM memory_entries WHERE id = ?1",
            params![id.to_string()],
        )?;

        if rows_affected > 0 {
            debug!("Deleted entry {}", id);
        }

        Ok(rows_affected > 0)
    }

    /// List a user's entries, newest first, restartable via offset.
    pub fn list(
        &self,
        user_id: &str,
        filter: &ListFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MemoryEntry>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM memory_entries WHERE user_id = ?");
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id.to_string())];

        if let Some(session_id) = &filter.session_id {
            sql.push_str(" AND session_id = ?");
            values.push(Box::new(session_id.clone()));
        }
        if let Some(agent_id) = &filter.agent_id {
            sql.push_str(" AND agent_id = ?");
            values.push(Box::new(agent_id.clone()));
        }

        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");
        values.push(Box::new(limit as i64));
        values.push(Box::new(offset as i64));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|b| b.as_ref()).collect();
        let mut rows = stmt.query(params_refs.as_slice())?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(Self::row_to_entry(row)?);
        }

        Ok(entries)
    }

    /// Convert a database row to a MemoryEntry.
    ///
    /// Expected column order: id, user_id, session_id, agent_id, content,
    /// metadata, tags, importance, created_at, updated_at
    pub(crate) fn row_to_entry(row: &rusqlite::Row) -> Result<MemoryEntry> {
        let id_str: String = row.get(0)?;
        let user_id: String = row.get(1)?;
        let session_id: Option<String> = row.get(2)?;
        let agent_id: Option<String> = row.get(3)?;
        let content: String = row.get(4)?;
        let metadata_json: String = row.get(5)?;
        let tags_json: String = row.get(6)?;
        let importance: f32 = row.get(7)?;
        let created_at_str: String = row.get(8)?;
        let updated_at_str: String = row.get(9)?;

        let id = EntryId::parse(&id_str)?;
        let metadata: Metadata = serde_json::from_str(&metadata_json)?;
        let tags: Vec<String> = serde_json::from_str(&tags_json)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| MemoryError::InvalidData(e.to_string()))?
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| MemoryError::InvalidData(e.to_string()))?
            .with_timezone(&Utc);

        Ok(MemoryEntry {
            id,
            user_id,
            session_id,
            agent_id,
            content,
            metadata,
            tags,
            importance,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    fn create_test_store() -> MemoryStore {
        MemoryStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_entry_crud() {
        let store = create_test_store();

        let entry = MemoryEntry::new("u1", "Test content").with_tag("test");
        store.insert(&entry).unwrap();

        let fetched = store.get(entry.id).unwrap().unwrap();
        assert_eq!(fetched.content, "Test content");
        assert_eq!(fetched.tags, vec!["test"]);

        let updated = store
            .update(entry.id, &UpdatePatch::new().content("Updated content"))
            .unwrap();
        assert!(updated);

        let fetched = store.get(entry.id).unwrap().unwrap();
        assert_eq!(fetched.content, "Updated content");

        assert!(store.delete(entry.id).unwrap());
        assert!(store.get(entry.id).unwrap().is_none());
        // Idempotent delete
        assert!(!store.delete(entry.id).unwrap());
    }

    #[test]
    fn test_create_get_round_trip() {
        let store = create_test_store();

        let entry = MemoryEntry::new("u1", "round trip")
            .with_session("s1")
            .with_agent("a1")
            .with_importance(0.7)
            .with_tags(["user", "message"])
            .with_metadata("role", serde_json::json!("user"));
        store.insert(&entry).unwrap();

        let fetched = store.get(entry.id).unwrap().unwrap();
        assert_eq!(fetched.id, entry.id);
        assert_eq!(fetched.user_id, entry.user_id);
        assert_eq!(fetched.session_id, entry.session_id);
        assert_eq!(fetched.agent_id, entry.agent_id);
        assert_eq!(fetched.content, entry.content);
        assert_eq!(fetched.metadata, entry.metadata);
        assert_eq!(fetched.tags, entry.tags);
        assert_eq!(fetched.importance, entry.importance);
        assert_eq!(fetched.created_at, entry.created_at);
        assert_eq!(fetched.updated_at, entry.updated_at);
    }

    #[test]
    fn test_insert_rejects_invalid() {
        let store = create_test_store();

        let err = store.insert(&MemoryEntry::new("", "content")).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::Validation(ValidationError::EmptyUserId)
        ));

        let err = store.insert(&MemoryEntry::new("u1", "")).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::Validation(ValidationError::EmptyContent)
        ));

        // Nothing was written
        assert_eq!(store.count(None).unwrap(), 0);
    }

    #[test]
    fn test_insert_clamps_importance() {
        let store = create_test_store();

        let mut entry = MemoryEntry::new("u1", "over");
        entry.importance = 3.5; // bypass the clamping builder
        store.insert(&entry).unwrap();
        assert_eq!(store.get(entry.id).unwrap().unwrap().importance, 1.0);

        let mut entry = MemoryEntry::new("u1", "under");
        entry.importance = -2.0;
        store.insert(&entry).unwrap();
        assert_eq!(store.get(entry.id).unwrap().unwrap().importance, 0.0);
    }

    #[test]
    fn test_nan_importance_stored_as_zero() {
        let store = create_test_store();

        // SQLite stores a NaN REAL as NULL, so NaN must never reach the
        // database or the row becomes unreadable.
        let mut entry = MemoryEntry::new("u1", "not a number");
        entry.importance = f32::NAN;
        store.insert(&entry).unwrap();
        assert_eq!(store.get(entry.id).unwrap().unwrap().importance, 0.0);

        assert!(store
            .update(entry.id, &UpdatePatch::new().importance(f32::NAN))
            .unwrap());
        assert_eq!(store.get(entry.id).unwrap().unwrap().importance, 0.0);
    }

    #[test]
    fn test_update_empty_patch_is_noop() {
        let store = create_test_store();

        let entry = MemoryEntry::new("u1", "unchanged");
        store.insert(&entry).unwrap();

        assert!(!store.update(entry.id, &UpdatePatch::new()).unwrap());

        let fetched = store.get(entry.id).unwrap().unwrap();
        assert_eq!(fetched.content, "unchanged");
        assert_eq!(fetched.updated_at, entry.updated_at);
    }

    #[test]
    fn test_update_absent_returns_false() {
        let store = create_test_store();
        let patch = UpdatePatch::new().content("anything");
        assert!(!store.update(EntryId::new(), &patch).unwrap());
    }

    #[test]
    fn test_update_clamps_importance_and_advances_updated_at() {
        let store = create_test_store();

        let entry = MemoryEntry::new("u1", "keep me").with_importance(0.5);
        store.insert(&entry).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(store
            .update(entry.id, &UpdatePatch::new().importance(1.5))
            .unwrap());

        let fetched = store.get(entry.id).unwrap().unwrap();
        assert_eq!(fetched.importance, 1.0);
        assert!(fetched.updated_at > entry.updated_at);
        // Content untouched by a partial patch
        assert_eq!(fetched.content, "keep me");
        assert_eq!(fetched.created_at, entry.created_at);
    }

    #[test]
    fn test_list_newest_first_with_offset() {
        let store = create_test_store();

        let mut ids = Vec::new();
        for i in 0..5i64 {
            let mut entry = MemoryEntry::new("u1", format!("entry {i}"));
            // Spread created_at so ordering is deterministic
            entry.created_at = entry.created_at - chrono::Duration::seconds(10 - i);
            store.insert(&entry).unwrap();
            ids.push(entry.id);
        }

        let all = store.list("u1", &ListFilter::all(), 100, 0).unwrap();
        assert_eq!(all.len(), 5);
        // Newest first: the last-created entry leads
        assert_eq!(all[0].id, ids[4]);
        assert_eq!(all[4].id, ids[0]);

        let page = store.list("u1", &ListFilter::all(), 2, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[2]);
        assert_eq!(page[1].id, ids[1]);
    }

    #[test]
    fn test_list_filters_by_session_and_agent() {
        let store = create_test_store();

        store
            .insert(&MemoryEntry::new("u1", "s1 turn").with_session("s1"))
            .unwrap();
        store
            .insert(&MemoryEntry::new("u1", "s2 turn").with_session("s2"))
            .unwrap();
        store
            .insert(&MemoryEntry::new("u1", "agent note").with_agent("a1"))
            .unwrap();

        let s1 = store.list("u1", &ListFilter::session("s1"), 10, 0).unwrap();
        assert_eq!(s1.len(), 1);
        assert_eq!(s1[0].content, "s1 turn");

        let a1 = store.list("u1", &ListFilter::agent("a1"), 10, 0).unwrap();
        assert_eq!(a1.len(), 1);
        assert_eq!(a1[0].content, "agent note");
    }

    #[test]
    fn test_list_scope_isolation() {
        let store = create_test_store();

        store.insert(&MemoryEntry::new("alice", "alice's note")).unwrap();
        store.insert(&MemoryEntry::new("bob", "bob's note")).unwrap();

        let alice = store.list("alice", &ListFilter::all(), 10, 0).unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].content, "alice's note");

        let bob = store.list("bob", &ListFilter::all(), 10, 0).unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].content, "bob's note");
    }

    #[test]
    fn test_insert_ids_unique() {
        let store = create_test_store();

        let mut ids = std::collections::HashSet::new();
        for i in 0..50 {
            let entry = MemoryEntry::new("u1", format!("entry {i}"));
            store.insert(&entry).unwrap();
            assert!(ids.insert(entry.id));
        }
    }
}
