//! Contract of the remote folder service.

use async_trait::async_trait;

use stockroom_core::result::AppResult;
use stockroom_core::types::{FolderId, ItemId, PageRequest, PageResponse};
use stockroom_entity::folder::{
    CloneFolder, CreateFolder, FolderAlert, FolderFilter, FolderHistoryEntry, FolderLabel,
    FolderPermission, FolderRecord, FolderTree, UpdateFolder,
};
use stockroom_entity::item::{ItemPatch, ItemQuery, ItemRecord};

/// The remote folder service as the hierarchy core consumes it.
///
/// Implementations translate their own failures into [`AppError`] kinds:
/// unreachable service -> `Transport`, missing folder -> `NotFound`,
/// sibling name collision -> `Conflict`, blocked delete -> `HasChildren`
/// or `HasItems`. The store's rollback policy depends on that mapping.
///
/// [`AppError`]: stockroom_core::AppError
#[async_trait]
pub trait FolderRemote: Send + Sync + std::fmt::Debug + 'static {
    /// List folders matching `filter`.
    async fn list_folders(&self, filter: &FolderFilter) -> AppResult<Vec<FolderRecord>>;

    /// Precomputed folder tree of the whole collection.
    async fn folder_hierarchy(&self) -> AppResult<FolderTree>;

    /// Items directly inside `folder_id`.
    async fn folder_items(
        &self,
        folder_id: FolderId,
        query: &ItemQuery,
    ) -> AppResult<PageResponse<ItemRecord>>;

    /// Create a folder and return the stored record.
    async fn create_folder(&self, data: &CreateFolder) -> AppResult<FolderRecord>;

    /// Apply a partial update and return the stored record.
    async fn update_folder(&self, id: FolderId, data: &UpdateFolder) -> AppResult<FolderRecord>;

    /// Delete a folder, reassigning its contents to `move_items_to` when given.
    async fn delete_folder(&self, id: FolderId, move_items_to: Option<FolderId>) -> AppResult<()>;

    /// Clone a folder beside the original.
    async fn clone_folder(&self, id: FolderId, request: &CloneFolder) -> AppResult<FolderRecord>;

    /// Reparent a folder (`None` moves it to the root).
    async fn move_folder(&self, id: FolderId, new_parent_id: Option<FolderId>)
    -> AppResult<FolderRecord>;

    /// Apply `patch` to every listed item.
    async fn bulk_update_items(&self, item_ids: &[ItemId], patch: &ItemPatch) -> AppResult<()>;

    /// Change history of a folder.
    async fn folder_history(
        &self,
        id: FolderId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FolderHistoryEntry>>;

    /// Permission grants on a folder.
    async fn folder_permissions(&self, id: FolderId) -> AppResult<Vec<FolderPermission>>;

    /// Replace the permission grants on a folder.
    async fn set_folder_permissions(
        &self,
        id: FolderId,
        permissions: &[FolderPermission],
    ) -> AppResult<Vec<FolderPermission>>;

    /// Alerts configured on a folder.
    async fn folder_alerts(&self, id: FolderId) -> AppResult<Vec<FolderAlert>>;

    /// Replace the alerts configured on a folder.
    async fn set_folder_alerts(&self, id: FolderId, alerts: &[FolderAlert])
    -> AppResult<Vec<FolderAlert>>;

    /// Label templates attached to a folder.
    async fn folder_labels(&self, id: FolderId) -> AppResult<Vec<FolderLabel>>;

    /// Replace the label templates attached to a folder.
    async fn set_folder_labels(&self, id: FolderId, labels: &[FolderLabel])
    -> AppResult<Vec<FolderLabel>>;
}
