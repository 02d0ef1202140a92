//! Request bodies and error envelope of the inventory API.

use serde::{Deserialize, Serialize};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::types::{FolderId, ItemId};
use stockroom_entity::item::ItemPatch;

/// `POST /folders/{id}/move` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBody {
    /// New parent; `null` moves to the root.
    pub parent_id: Option<FolderId>,
}

/// `POST /items/bulk-update` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateBody<'a> {
    /// Items to patch.
    pub item_ids: &'a [ItemId],
    /// Fields applied to every item.
    #[serde(flatten)]
    pub patch: ItemPatch,
}

/// Error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    /// The error.
    pub error: ErrorBody,
}

/// Machine-readable code plus user-facing message.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Stable error code, e.g. `has_children`.
    #[serde(default)]
    pub code: String,
    /// User-facing message.
    #[serde(default)]
    pub message: String,
}

/// Translate a non-success response into an [`AppError`].
///
/// `body` is the raw response text; when it carries the error envelope its
/// code refines the kind and its message is used verbatim.
pub fn error_from_response(status: u16, body: &str) -> AppError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let code = envelope.as_ref().map(|e| e.code.as_str()).unwrap_or("");
    let message = envelope
        .as_ref()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback_message(status, body));

    let kind = match (status, code) {
        (_, "has_children") => ErrorKind::HasChildren,
        (_, "has_items") => ErrorKind::HasItems,
        (_, "duplicate_name") => ErrorKind::Conflict,
        (_, "cycle") => ErrorKind::Cycle,
        (404, _) | (_, "not_found") => ErrorKind::NotFound,
        (409, _) => ErrorKind::Conflict,
        (400 | 422, _) | (_, "validation") => ErrorKind::Validation,
        (502..=504, _) => ErrorKind::Transport,
        _ => ErrorKind::ExternalService,
    };
    AppError::new(kind, message)
}

fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.starts_with('<') {
        format!("Inventory API returned HTTP {status}")
    } else {
        let snippet: String = body.chars().take(200).collect();
        format!("Inventory API returned HTTP {status}: {snippet}")
    }
}
