//! Records the dashboard reads and writes around a folder without the
//! hierarchy core interpreting them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::types::FolderId;

/// One entry of a folder's change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderHistoryEntry {
    /// The folder the entry belongs to.
    pub folder_id: FolderId,
    /// Short action label, e.g. `"renamed"`.
    pub action: String,
    /// Who performed the action, if known.
    #[serde(default)]
    pub actor: Option<String>,
    /// Action-specific details.
    #[serde(default)]
    pub details: serde_json::Value,
    /// When the action happened.
    pub occurred_at: DateTime<Utc>,
}

/// Access granted to a principal on a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPermission {
    /// User or group the grant applies to.
    pub principal: String,
    /// Access level, e.g. `"viewer"` or `"editor"`.
    pub access: String,
}

/// A stock alert configured on a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderAlert {
    /// Alert kind, e.g. `"low_stock"`.
    pub kind: String,
    /// Threshold that triggers the alert.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Whether the alert is active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A printable label template attached to a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderLabel {
    /// Label template name.
    pub template: String,
    /// Number of copies to print.
    #[serde(default = "default_copies")]
    pub copies: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_copies() -> u32 {
    1
}
