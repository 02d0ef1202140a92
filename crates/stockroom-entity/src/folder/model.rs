//! Folder entity model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::types::FolderId;

/// A folder in the inventory hierarchy, as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name, unique among siblings (case-insensitive).
    pub name: String,
    /// Parent folder ID (`None` for root folders).
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Tags; order carries no meaning.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Image references owned by the upload service.
    #[serde(default)]
    pub images: Vec<String>,
    /// Number of items directly in this folder, computed remotely.
    #[serde(default)]
    pub item_count: u64,
    /// Summed value of contained items, computed remotely.
    #[serde(default)]
    pub total_value: f64,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl FolderRecord {
    /// Build a bare record with the given identity. Remote services and
    /// fixtures fill in the rest.
    pub fn new(id: FolderId, name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            parent_id,
            description: None,
            notes: None,
            tags: BTreeSet::new(),
            images: Vec::new(),
            item_count: 0,
            total_value: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether this folder holds any items according to the remote counts.
    pub fn has_items(&self) -> bool {
        self.item_count > 0
    }
}

/// Canonical form used for sibling name comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
