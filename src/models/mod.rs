//! Data models for Qatrace entities.
//!
//! This module defines the core data structures:
//! - `ChecklistTemplate` - Catalog-defined `{id, text}` pair under a feature
//! - `DraftItem` - A template tagged with its feature, before a session exists
//! - `ChecklistItem` - Session-scoped instance with status and bug reference
//! - `ChecklistDraft` - The client's editable list before confirmation
//! - `SessionId` - Opaque random token addressing a session

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of random bytes in a session identifier.
pub const SESSION_ID_BYTES: usize = 16;

/// Length of a rendered session identifier (hex, two chars per byte).
pub const SESSION_ID_LEN: usize = SESSION_ID_BYTES * 2;

/// Bug reference recorded by the client when an item fails without one.
pub const UNSPECIFIED_BUG_ID: &str = "N/A";

/// Test status of a checklist item.
///
/// Any state may move to any other; there is no terminal state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ItemStatus {
    #[default]
    Pending,
    Pass,
    Failed,
}

impl ItemStatus {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ItemStatus::Pending),
            "pass" | "passed" => Some(ItemStatus::Pass),
            "failed" | "fail" => Some(ItemStatus::Failed),
            _ => None,
        }
    }

    /// Wire representation (`Pending`, `Pass`, `Failed`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::Pass => "Pass",
            ItemStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| format!("Unknown status: {} (expected pending, pass or failed)", s))
    }
}

/// A checklist template as it appears in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    pub id: String,
    pub text: String,
}

/// A catalog template tagged with the feature it was merged under.
///
/// This is what the merge operation returns and what session creation takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftItem {
    pub id: String,
    pub text: String,
    pub feature: String,
}

impl DraftItem {
    /// Tag a template with its originating feature.
    pub fn from_template(template: &ChecklistTemplate, feature: &str) -> Self {
        Self {
            id: template.id.clone(),
            text: template.text.clone(),
            feature: feature.to_string(),
        }
    }
}

/// A checklist item tracked inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Catalog id; unique within a session, not globally
    pub id: String,

    /// Checklist description
    pub text: String,

    /// Feature the item was merged under
    pub feature: String,

    /// Current test status
    #[serde(default)]
    pub status: ItemStatus,

    /// Bug reference (serialized as `null` when absent)
    #[serde(default)]
    pub bug_id: Option<String>,
}

impl ChecklistItem {
    /// Instantiate a draft item as `Pending` with no bug reference.
    pub fn from_draft(draft: DraftItem) -> Self {
        Self {
            id: draft.id,
            text: draft.text,
            feature: draft.feature,
            status: ItemStatus::Pending,
            bug_id: None,
        }
    }

    /// Overwrite status and bug reference together.
    ///
    /// The bug reference is stored as given, whatever the new status.
    pub fn apply(&mut self, update: &StatusUpdate) {
        self.status = update.status;
        self.bug_id = update.bug_id.clone();
    }

    /// Bug reference as shown in reports: the bug id for failed items, `-` otherwise.
    pub fn bug_display(&self) -> &str {
        match (&self.status, &self.bug_id) {
            (ItemStatus::Failed, Some(bug)) => bug.as_str(),
            _ => "-",
        }
    }
}

/// A status transition request for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: ItemStatus,
    pub bug_id: Option<String>,
}

impl StatusUpdate {
    /// Build an update; an empty bug reference counts as absent.
    pub fn new(status: ItemStatus, bug_id: Option<String>) -> Self {
        Self {
            status,
            bug_id: bug_id.filter(|b| !b.is_empty()),
        }
    }

    /// Build the update a tester issues from the client.
    ///
    /// Failed items always carry a reference (`N/A` when none was given);
    /// every other status clears it.
    pub fn from_client(status: ItemStatus, bug_id: Option<String>) -> Self {
        let bug_id = match status {
            ItemStatus::Failed => Some(
                bug_id
                    .filter(|b| !b.trim().is_empty())
                    .unwrap_or_else(|| UNSPECIFIED_BUG_ID.to_string()),
            ),
            _ => None,
        };
        Self { status, bug_id }
    }
}

/// Opaque session identifier: 128 random bits rendered as 32 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let bytes: [u8; SESSION_ID_BYTES] = rand::random();
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `s` could name a session: non-empty, hex digits only.
    pub fn is_well_formed(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The client's working copy of a selection, before it becomes a session.
///
/// Edits stay local; the list reaches the server only when it is confirmed
/// as a new session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistDraft {
    items: Vec<DraftItem>,
}

impl ChecklistDraft {
    pub fn new(items: Vec<DraftItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every item with the given id. Returns how many were removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before - self.items.len()
    }
}
