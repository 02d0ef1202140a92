//! Degraded-mode providers: what the store shows when the remote service
//! cannot be reached.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use stockroom_core::config::store::{DegradedMode, StoreConfig};
use stockroom_core::error::AppError;
use stockroom_core::result::AppResult;
use stockroom_core::types::FolderId;
use stockroom_entity::folder::FolderRecord;
use stockroom_entity::item::ItemRecord;

/// Supplies stand-in data when the remote service is unreachable.
///
/// The store only consults the provider when its own collection is empty;
/// last-known-good data always wins over fallback data.
pub trait DegradedModeProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Folders to show when nothing has been loaded yet.
    fn fallback_folders(&self) -> Option<Vec<FolderRecord>>;

    /// Items to show for `folder_id` when nothing has been loaded yet.
    fn fallback_items(&self, folder_id: FolderId) -> Option<Vec<ItemRecord>>;
}

/// Keeps the last successfully loaded data and offers nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepLastKnown;

impl DegradedModeProvider for KeepLastKnown {
    fn name(&self) -> &'static str {
        "keep_last"
    }

    fn fallback_folders(&self) -> Option<Vec<FolderRecord>> {
        None
    }

    fn fallback_items(&self, _folder_id: FolderId) -> Option<Vec<ItemRecord>> {
        None
    }
}

/// Serves a fixed snapshot, typically demo data loaded from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticFallback {
    /// Fallback folder collection.
    #[serde(default)]
    pub folders: Vec<FolderRecord>,
    /// Fallback items, matched to folders by `folder_id`.
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

impl StaticFallback {
    /// Build from in-memory data.
    pub fn new(folders: Vec<FolderRecord>, items: Vec<ItemRecord>) -> Self {
        Self { folders, items }
    }

    /// Load a `{ "folders": [...], "items": [...] }` JSON file.
    pub async fn from_file(path: &str) -> AppResult<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                stockroom_core::ErrorKind::Configuration,
                format!("Failed to read fallback snapshot '{path}'"),
                e,
            )
        })?;
        let snapshot: Self = serde_json::from_str(&raw)?;
        info!(
            path,
            folders = snapshot.folders.len(),
            items = snapshot.items.len(),
            "Loaded degraded-mode snapshot"
        );
        Ok(snapshot)
    }
}

impl DegradedModeProvider for StaticFallback {
    fn name(&self) -> &'static str {
        "static"
    }

    fn fallback_folders(&self) -> Option<Vec<FolderRecord>> {
        Some(self.folders.clone())
    }

    fn fallback_items(&self, folder_id: FolderId) -> Option<Vec<ItemRecord>> {
        Some(
            self.items
                .iter()
                .filter(|i| i.folder_id == Some(folder_id))
                .cloned()
                .collect(),
        )
    }
}

/// Build the provider selected by `store.degraded_mode`.
pub async fn from_config(config: &StoreConfig) -> AppResult<Arc<dyn DegradedModeProvider>> {
    match config.degraded_mode {
        DegradedMode::KeepLast => Ok(Arc::new(KeepLastKnown)),
        DegradedMode::Static => {
            let path = config.fallback_path.as_deref().ok_or_else(|| {
                AppError::configuration("store.fallback_path is required for static degraded mode")
            })?;
            Ok(Arc::new(StaticFallback::from_file(path).await?))
        }
    }
}
