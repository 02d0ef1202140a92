//! Move legality and sibling-name uniqueness checks.

use stockroom_core::error::AppError;
use stockroom_core::result::AppResult;
use stockroom_core::types::FolderId;
use stockroom_entity::folder::FolderRecord;
use stockroom_entity::folder::model::normalize_name;

use super::tree::TreeIndex;

/// Decides whether a reparent keeps the hierarchy a forest and whether a
/// name collides with a sibling. Stateless; every check takes the full
/// folder collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleGuard;

impl CycleGuard {
    /// Whether `folder_id` may be placed under `candidate_parent_id`.
    ///
    /// Moving to the root (`None`) is always legal. Moving under itself or
    /// under any of its descendants is not.
    pub fn is_legal_move(
        folder_id: FolderId,
        candidate_parent_id: Option<FolderId>,
        all_folders: &[FolderRecord],
    ) -> bool {
        let Some(candidate) = candidate_parent_id else {
            return true;
        };
        if candidate == folder_id {
            return false;
        }
        !TreeIndex::new(all_folders)
            .descendants_of(folder_id)
            .contains(&candidate)
    }

    /// Whether a folder other than `excluding_id` under `parent_id` already
    /// uses `name`, compared case-insensitively.
    pub fn is_duplicate_name(
        name: &str,
        parent_id: Option<FolderId>,
        all_folders: &[FolderRecord],
        excluding_id: Option<FolderId>,
    ) -> bool {
        let wanted = normalize_name(name);
        TreeIndex::new(all_folders)
            .children_of(parent_id)
            .iter()
            .any(|f| Some(f.id) != excluding_id && normalize_name(&f.name) == wanted)
    }

    /// Folders offered as new parents for `folder_id`: everything except the
    /// folder itself and its descendants, in collection order.
    pub fn parent_options(folder_id: FolderId, all_folders: &[FolderRecord]) -> Vec<FolderRecord> {
        let excluded = TreeIndex::new(all_folders).descendants_of(folder_id);
        all_folders
            .iter()
            .filter(|f| f.id != folder_id && !excluded.contains(&f.id))
            .cloned()
            .collect()
    }

    /// [`is_legal_move`](Self::is_legal_move) as a `Cycle` error.
    pub fn check_move(
        folder_id: FolderId,
        candidate_parent_id: Option<FolderId>,
        all_folders: &[FolderRecord],
    ) -> AppResult<()> {
        if candidate_parent_id == Some(folder_id) {
            return Err(AppError::cycle("Cannot move a folder into itself"));
        }
        if !Self::is_legal_move(folder_id, candidate_parent_id, all_folders) {
            return Err(AppError::cycle(
                "Cannot move a folder into one of its descendants",
            ));
        }
        Ok(())
    }

    /// Validate `name` for placement under `parent_id`: non-empty and not
    /// taken by a sibling other than `excluding_id`.
    pub fn check_name(
        name: &str,
        parent_id: Option<FolderId>,
        all_folders: &[FolderRecord],
        excluding_id: Option<FolderId>,
    ) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }
        if Self::is_duplicate_name(name, parent_id, all_folders, excluding_id) {
            return Err(AppError::conflict(format!(
                "A folder named '{}' already exists here",
                name.trim()
            )));
        }
        Ok(())
    }
}
