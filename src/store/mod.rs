//! Session storage.
//!
//! A session is the ordered list of checklist items one test run tracks,
//! addressed by a random [`SessionId`]. The [`SessionStore`] trait is the seam
//! the HTTP handlers are written against; [`MemorySessionStore`] keeps
//! sessions for the lifetime of the process.

mod memory;

pub use memory::MemorySessionStore;

use crate::Result;
use crate::models::{ChecklistItem, DraftItem, SessionId, StatusUpdate};

/// Trait for session stores.
///
/// Implementations must make a single item's status and bug reference change
/// together, and must not let operations on one session block another.
pub trait SessionStore: Send + Sync {
    /// Create a session from a non-empty list of items, all starting `Pending`.
    fn create(&self, items: Vec<DraftItem>) -> Result<SessionId>;

    /// Read a session's items, in creation order.
    fn get(&self, session_id: &str) -> Result<Vec<ChecklistItem>>;

    /// Read the first item with `item_id` from a session.
    fn item(&self, session_id: &str, item_id: &str) -> Result<ChecklistItem>;

    /// Overwrite the status and bug reference of the first item with `item_id`.
    ///
    /// Returns the item as stored after the update.
    fn update_item(
        &self,
        session_id: &str,
        item_id: &str,
        update: &StatusUpdate,
    ) -> Result<ChecklistItem>;

    /// Number of live sessions.
    fn len(&self) -> usize;

    /// Whether the store holds no sessions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
