//! Request payloads sent to the remote folder service.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use stockroom_core::types::FolderId;

/// Data required to create a new folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Parent folder (`None` for root).
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Image references.
    #[serde(default)]
    pub images: Vec<String>,
}

impl CreateFolder {
    /// A create request with only a name and parent.
    pub fn named(name: impl Into<String>, parent_id: Option<FolderId>) -> Self {
        Self {
            name: name.into(),
            parent_id,
            ..Self::default()
        }
    }
}

/// Partial update of a folder. `None` fields are left unchanged.
///
/// `parent_id` is doubly optional: `None` keeps the current parent,
/// `Some(None)` moves the folder to the root, `Some(Some(id))` reparents it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolder {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New parent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub parent_id: Option<Option<FolderId>>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Replacement tag set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    /// Replacement image list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl UpdateFolder {
    /// A rename-only update.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<FolderId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<FolderId>::deserialize(deserializer).map(Some)
}

/// Parameters of a clone request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneFolder {
    /// Name of the new folder.
    pub new_name: String,
    /// Whether contained items are duplicated into the clone.
    #[serde(default)]
    pub include_items: bool,
}

/// Filter parameters for listing folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFilter {
    /// Case-insensitive substring match on the folder name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Only folders directly under this parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FolderId>,
    /// Only folders carrying all of these tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl FolderFilter {
    /// Whether the filter selects every folder.
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_none() && self.parent_id.is_none() && self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = UpdateFolder::rename("Tools");
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json, serde_json::json!({ "name": "Tools" }));
    }

    #[test]
    fn test_update_move_to_root_serializes_null_parent() {
        let update = UpdateFolder {
            parent_id: Some(None),
            ..UpdateFolder::default()
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json, serde_json::json!({ "parentId": null }));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_deserializes_null_parent_as_move_to_root() {
        let update: UpdateFolder =
            serde_json::from_value(serde_json::json!({ "parentId": null })).expect("deserialize");
        assert_eq!(update.parent_id, Some(None));

        let update: UpdateFolder =
            serde_json::from_value(serde_json::json!({ "name": "X" })).expect("deserialize");
        assert_eq!(update.parent_id, None);
    }
}
