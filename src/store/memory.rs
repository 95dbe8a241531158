//! In-memory session store.

use super::SessionStore;
use crate::models::{ChecklistItem, DraftItem, SessionId, StatusUpdate};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

const ITEM_NOT_FOUND: &str = "Checklist item not found in this session.";

/// A stored session and its bookkeeping timestamps.
#[derive(Debug)]
struct SessionEntry {
    items: Vec<ChecklistItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Process-lifetime session table.
///
/// The map lock is only held long enough to find a session; each session
/// then has its own mutex, so updates to different sessions never contend
/// and concurrent updates to the same session are serialized.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<SessionEntry>>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, session_id: &str) -> Result<Arc<Mutex<SessionEntry>>> {
        self.sessions
            .read()
            .get(session_id)
            .map(Arc::clone)
            .ok_or_else(|| Error::NotFound("Test session not found.".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, items: Vec<DraftItem>) -> Result<SessionId> {
        if items.is_empty() {
            return Err(Error::Validation("Checklists are empty.".to_string()));
        }

        let now = Utc::now();
        let entry = SessionEntry {
            items: items.into_iter().map(ChecklistItem::from_draft).collect(),
            created_at: now,
            updated_at: now,
        };
        let count = entry.items.len();

        let mut sessions = self.sessions.write();
        let session_id = loop {
            let candidate = SessionId::generate();
            if let Entry::Vacant(slot) = sessions.entry(candidate.clone()) {
                slot.insert(Arc::new(Mutex::new(entry)));
                break candidate;
            }
        };

        tracing::info!(session_id = %session_id, items = count, "session created");
        Ok(session_id)
    }

    fn get(&self, session_id: &str) -> Result<Vec<ChecklistItem>> {
        let entry = self.entry(session_id)?;
        let entry = entry.lock();
        Ok(entry.items.clone())
    }

    fn item(&self, session_id: &str, item_id: &str) -> Result<ChecklistItem> {
        let entry = self.entry(session_id)?;
        let entry = entry.lock();
        entry
            .items
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(ITEM_NOT_FOUND.to_string()))
    }

    fn update_item(
        &self,
        session_id: &str,
        item_id: &str,
        update: &StatusUpdate,
    ) -> Result<ChecklistItem> {
        let entry = self.entry(session_id)?;
        let mut entry = entry.lock();

        let item = entry
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| {
                Error::NotFound(ITEM_NOT_FOUND.to_string())
            })?;
        item.apply(update);
        let updated = item.clone();
        entry.updated_at = Utc::now();

        tracing::info!(
            session_id,
            item_id,
            status = %updated.status,
            bug_id = ?updated.bug_id,
            session_age_secs = (entry.updated_at - entry.created_at).num_seconds(),
            "item status updated"
        );
        Ok(updated)
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
