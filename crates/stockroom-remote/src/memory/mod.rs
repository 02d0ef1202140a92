//! In-process folder service.

pub mod fault;
mod state;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_core::types::{FolderId, ItemId, PageRequest, PageResponse};
use stockroom_entity::folder::{
    CloneFolder, CreateFolder, FolderAlert, FolderFilter, FolderHistoryEntry, FolderLabel,
    FolderPermission, FolderRecord, FolderTree, UpdateFolder,
};
use stockroom_entity::item::{ItemPatch, ItemQuery, ItemRecord};
use stockroom_service::FolderRemote;

pub use fault::{HeldCall, Operation};
pub use state::Seed;

use fault::FaultInjector;
use state::ServiceState;

/// Folder service living in process memory.
///
/// Enforces the same rules as the hosted API: sibling names are unique
/// (case-insensitive), a folder cannot be moved under itself or a
/// descendant, and deleting a non-empty folder needs a destination for its
/// contents. Item counts and values are derived from stored items.
///
/// Clones share state, so a test can keep one handle for inspection and
/// fault injection while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFolderRemote {
    state: Arc<RwLock<ServiceState>>,
    faults: Arc<FaultInjector>,
}

impl InMemoryFolderRemote {
    /// An empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// A service holding `seed`.
    pub fn with_seed(seed: Seed) -> Self {
        Self {
            state: Arc::new(RwLock::new(ServiceState::from_seed(seed))),
            faults: Arc::default(),
        }
    }

    /// A service holding `folders` and `items`.
    pub fn with_data(folders: Vec<FolderRecord>, items: Vec<ItemRecord>) -> Self {
        Self::with_seed(Seed { folders, items })
    }

    /// A service seeded from a JSON file with `folders` and `items` arrays.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to read seed file: {}", path.display()),
                e,
            )
        })?;
        let seed: Seed = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            folders = seed.folders.len(),
            items = seed.items.len(),
            "Loaded in-memory remote seed"
        );
        Ok(Self::with_seed(seed))
    }

    /// Make every call fail with a transport error until turned back on.
    pub fn set_offline(&self, offline: bool) {
        self.faults.set_offline(offline);
    }

    /// Whether the service is simulating an outage.
    pub fn is_offline(&self) -> bool {
        self.faults.is_offline()
    }

    /// Fail the `n`-th call of `operation` from now (1 = the next one)
    /// with `error`.
    pub fn fail_nth(&self, operation: Operation, n: u64, error: AppError) {
        self.faults.fail_nth(operation, n, error);
    }

    /// Park the next call of `operation` until the returned handle is
    /// released, so a test can act while that call is in flight.
    pub fn hold_next(&self, operation: Operation) -> HeldCall {
        self.faults.hold_next(operation)
    }

    /// Drop pending failures and holds, and go back online. Call counts
    /// are kept.
    pub fn clear_faults(&self) {
        self.faults.clear();
    }

    /// Calls made to `operation` so far, including failed ones.
    pub fn call_count(&self, operation: Operation) -> u64 {
        self.faults.call_count(operation)
    }

    /// Stored folders as the service sees them.
    pub async fn stored_folders(&self) -> Vec<FolderRecord> {
        self.state.read().await.folders.clone()
    }

    /// Stored items as the service sees them.
    pub async fn stored_items(&self) -> Vec<ItemRecord> {
        self.state.read().await.items.clone()
    }

    async fn enter(&self, operation: Operation) -> AppResult<()> {
        debug!(operation = %operation, "In-memory remote call");
        if let Some(gate) = self.faults.take_gate(operation) {
            gate.pass().await;
        }
        self.faults.check(operation)
    }
}

#[async_trait]
impl FolderRemote for InMemoryFolderRemote {
    async fn list_folders(&self, filter: &FolderFilter) -> AppResult<Vec<FolderRecord>> {
        self.enter(Operation::ListFolders).await?;
        Ok(self.state.read().await.list(filter))
    }

    async fn folder_hierarchy(&self) -> AppResult<FolderTree> {
        self.enter(Operation::FolderHierarchy).await?;
        Ok(self.state.read().await.hierarchy())
    }

    async fn folder_items(
        &self,
        folder_id: FolderId,
        query: &ItemQuery,
    ) -> AppResult<PageResponse<ItemRecord>> {
        self.enter(Operation::FolderItems).await?;
        self.state.read().await.items_page(folder_id, query)
    }

    async fn create_folder(&self, data: &CreateFolder) -> AppResult<FolderRecord> {
        self.enter(Operation::CreateFolder).await?;
        self.state.write().await.create(data)
    }

    async fn update_folder(&self, id: FolderId, data: &UpdateFolder) -> AppResult<FolderRecord> {
        self.enter(Operation::UpdateFolder).await?;
        self.state.write().await.update(id, data)
    }

    async fn delete_folder(&self, id: FolderId, move_items_to: Option<FolderId>) -> AppResult<()> {
        self.enter(Operation::DeleteFolder).await?;
        self.state.write().await.delete(id, move_items_to)
    }

    async fn clone_folder(&self, id: FolderId, request: &CloneFolder) -> AppResult<FolderRecord> {
        self.enter(Operation::CloneFolder).await?;
        self.state.write().await.clone_folder(id, request)
    }

    async fn move_folder(
        &self,
        id: FolderId,
        new_parent_id: Option<FolderId>,
    ) -> AppResult<FolderRecord> {
        self.enter(Operation::MoveFolder).await?;
        self.state.write().await.move_folder(id, new_parent_id)
    }

    async fn bulk_update_items(&self, item_ids: &[ItemId], patch: &ItemPatch) -> AppResult<()> {
        self.enter(Operation::BulkUpdateItems).await?;
        self.state.write().await.bulk_update(item_ids, patch)
    }

    async fn folder_history(
        &self,
        id: FolderId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FolderHistoryEntry>> {
        self.enter(Operation::FolderHistory).await?;
        self.state.read().await.history(id, page)
    }

    async fn folder_permissions(&self, id: FolderId) -> AppResult<Vec<FolderPermission>> {
        self.enter(Operation::FolderPermissions).await?;
        self.state.read().await.permissions(id)
    }

    async fn set_folder_permissions(
        &self,
        id: FolderId,
        permissions: &[FolderPermission],
    ) -> AppResult<Vec<FolderPermission>> {
        self.enter(Operation::SetFolderPermissions).await?;
        self.state.write().await.set_permissions(id, permissions)
    }

    async fn folder_alerts(&self, id: FolderId) -> AppResult<Vec<FolderAlert>> {
        self.enter(Operation::FolderAlerts).await?;
        self.state.read().await.alerts(id)
    }

    async fn set_folder_alerts(
        &self,
        id: FolderId,
        alerts: &[FolderAlert],
    ) -> AppResult<Vec<FolderAlert>> {
        self.enter(Operation::SetFolderAlerts).await?;
        self.state.write().await.set_alerts(id, alerts)
    }

    async fn folder_labels(&self, id: FolderId) -> AppResult<Vec<FolderLabel>> {
        self.enter(Operation::FolderLabels).await?;
        self.state.read().await.labels(id)
    }

    async fn set_folder_labels(
        &self,
        id: FolderId,
        labels: &[FolderLabel],
    ) -> AppResult<Vec<FolderLabel>> {
        self.enter(Operation::SetFolderLabels).await?;
        self.state.write().await.set_labels(id, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_fails_with_transport() {
        let remote = InMemoryFolderRemote::new();
        remote.set_offline(true);
        let err = remote.list_folders(&FolderFilter::default()).await.unwrap_err();
        assert!(err.is_transport());

        remote.set_offline(false);
        assert!(remote.list_folders(&FolderFilter::default()).await.unwrap().is_empty());
        assert_eq!(remote.call_count(Operation::ListFolders), 2);
    }

    #[tokio::test]
    async fn test_fail_nth_hits_only_that_call() {
        let remote = InMemoryFolderRemote::new();
        remote.fail_nth(Operation::CreateFolder, 2, AppError::internal("boom"));

        assert!(remote.create_folder(&CreateFolder::named("A", None)).await.is_ok());
        let err = remote
            .create_folder(&CreateFolder::named("B", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(remote.create_folder(&CreateFolder::named("C", None)).await.is_ok());
        assert_eq!(remote.stored_folders().await.len(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let remote = InMemoryFolderRemote::new();
        let handle = remote.clone();
        remote
            .create_folder(&CreateFolder::named("Shared", None))
            .await
            .unwrap();
        assert_eq!(handle.stored_folders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_seed_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let root = FolderRecord::new(FolderId::new(), "Warehouse", None);
        let item = ItemRecord::new(ItemId::new(), "Pallet", Some(root.id));
        let seed = Seed {
            folders: vec![root.clone()],
            items: vec![item],
        };
        tokio::fs::write(&path, serde_json::to_string(&seed).unwrap())
            .await
            .unwrap();

        let remote = InMemoryFolderRemote::from_seed_file(&path).await.unwrap();
        let folders = remote.stored_folders().await;
        assert_eq!(folders[0].id, root.id);
        assert_eq!(folders[0].item_count, 1);
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_configuration_error() {
        let err = InMemoryFolderRemote::from_seed_file("/nonexistent/seed.json")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
