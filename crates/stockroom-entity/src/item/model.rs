//! Item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::types::{FolderId, ItemId, PageRequest};

/// An inventory item as listed inside a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Unique item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Containing folder (`None` means unassigned).
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    /// Units on hand.
    #[serde(default)]
    pub quantity: u64,
    /// Value per unit.
    #[serde(default)]
    pub value: f64,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ItemRecord {
    /// Build an item in `folder_id`.
    pub fn new(id: ItemId, name: impl Into<String>, folder_id: Option<FolderId>) -> Self {
        Self {
            id,
            name: name.into(),
            folder_id,
            quantity: 0,
            value: 0.0,
            updated_at: Utc::now(),
        }
    }
}

/// Patch applied by a bulk update. Relocation only ever sets the folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    /// Destination folder (`None` unassigns the items).
    pub folder_id: Option<FolderId>,
}

/// Parameters for listing the items of a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
    /// Case-insensitive substring match on the item name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_serializes_null_for_unassign() {
        let patch = ItemPatch { folder_id: None };
        let json = serde_json::to_value(patch).expect("serialize");
        assert_eq!(json, serde_json::json!({ "folderId": null }));
    }

    #[test]
    fn test_query_flattens_page() {
        let query = ItemQuery {
            page: PageRequest::new(2, 10),
            search: None,
        };
        let json = serde_json::to_value(&query).expect("serialize");
        assert_eq!(json, serde_json::json!({ "page": 2, "pageSize": 10 }));
    }
}
