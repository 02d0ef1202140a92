//! Authoritative in-memory folder collection with optimistic mutations.
//!
//! Each mutating operation walks the same phases:
//!
//! ```text
//! Validating -> Rejected
//!            -> OptimisticallyApplied -> RemoteInFlight -> Committed | RolledBack
//! ```
//!
//! Validation never touches state. A remote failure after an optimistic
//! mutation puts back the records it touched, as they were just before
//! it, except that a delete failing because the service is unreachable
//! keeps the local removal (see [`DeleteOutcome::LocalOnly`]). Create,
//! update and clone apply nothing locally until the remote answers.
//!
//! The store does not serialize operations against each other. Two
//! in-flight mutations of the same folder resolve last-writer-wins, and
//! most operations re-fetch from the remote afterwards.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use stockroom_core::config::store::StoreConfig;
use stockroom_core::error::AppError;
use stockroom_core::result::AppResult;
use stockroom_core::types::{FolderId, PageRequest, PageResponse};
use stockroom_entity::folder::{
    CloneFolder, CreateFolder, FolderAlert, FolderFilter, FolderHistoryEntry, FolderLabel,
    FolderPermission, FolderRecord, FolderTree, UpdateFolder,
};
use stockroom_entity::item::{ItemQuery, ItemRecord};

use super::degraded::{DegradedModeProvider, KeepLastKnown};
use super::guard::CycleGuard;
use super::snapshot::{Rollback, Snapshot};
use super::tree::TreeIndex;
use crate::remote::FolderRemote;

/// Phase of a mutating operation, emitted as a debug event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Checking preconditions against local state.
    Validating,
    /// A precondition failed; state untouched.
    Rejected,
    /// Local state already reflects the change.
    OptimisticallyApplied,
    /// Waiting on the remote service.
    RemoteInFlight,
    /// The remote accepted the change.
    Committed,
    /// The remote refused; touched records restored.
    RolledBack,
}

impl fmt::Display for MutationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validating => "validating",
            Self::Rejected => "rejected",
            Self::OptimisticallyApplied => "optimistically_applied",
            Self::RemoteInFlight => "remote_in_flight",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        };
        f.write_str(s)
    }
}

/// Result of loading data from the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fresh data replaced local state.
    Fresh {
        /// Number of records loaded.
        count: usize,
    },
    /// The remote was unreachable; local state kept or seeded from the
    /// degraded-mode provider.
    Degraded {
        /// Why the remote could not be used.
        reason: String,
    },
}

impl FetchOutcome {
    /// Whether fresh data was loaded.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh { .. })
    }
}

/// Result of a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The remote confirmed the delete.
    Committed,
    /// The remote was unreachable; the folder stays removed locally only.
    LocalOnly {
        /// Transport failure message.
        reason: String,
    },
}

/// Result of a clone, including the optional metadata follow-up.
#[derive(Debug, Clone)]
pub struct CloneOutcome {
    /// The new folder as currently known locally.
    pub folder: FolderRecord,
    /// Why applying the requested metadata failed, if it did. The clone
    /// itself exists either way.
    pub metadata_error: Option<AppError>,
}

/// Mutable state guarded by the store's lock.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) folders: Vec<FolderRecord>,
    pub(crate) selected_folder_id: Option<FolderId>,
    pub(crate) folder_items: Vec<ItemRecord>,
    pub(crate) folders_loading: bool,
    pub(crate) items_loading: bool,
    pub(crate) last_error: Option<AppError>,
}

impl StoreState {
    fn find(&self, id: FolderId) -> Option<&FolderRecord> {
        self.folders.iter().find(|f| f.id == id)
    }

    fn require(&self, id: FolderId) -> AppResult<&FolderRecord> {
        self.find(id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    fn require_parent(&self, parent_id: Option<FolderId>) -> AppResult<()> {
        match parent_id {
            Some(id) if self.find(id).is_none() => Err(AppError::not_found(format!(
                "Parent folder {id} not found"
            ))),
            _ => Ok(()),
        }
    }

    fn replace(&mut self, record: FolderRecord) {
        match self.folders.iter_mut().find(|f| f.id == record.id) {
            Some(slot) => *slot = record,
            None => self.folders.push(record),
        }
    }
}

/// Single source of truth for the folder hierarchy of one session.
///
/// Construct once and share as `Arc<FolderStore>`; every method takes
/// `&self`. Readers get clones of the state, never references into it.
pub struct FolderStore {
    remote: Arc<dyn FolderRemote>,
    degraded: Arc<dyn DegradedModeProvider>,
    config: StoreConfig,
    state: RwLock<StoreState>,
}

impl fmt::Debug for FolderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolderStore")
            .field("remote", &self.remote)
            .field("degraded", &self.degraded.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FolderStore {
    /// Creates a new folder store.
    pub fn new(
        remote: Arc<dyn FolderRemote>,
        degraded: Arc<dyn DegradedModeProvider>,
        config: StoreConfig,
    ) -> Self {
        Self {
            remote,
            degraded,
            config,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Creates a store that keeps last-known data when offline.
    pub fn with_remote(remote: Arc<dyn FolderRemote>) -> Self {
        Self::new(remote, Arc::new(KeepLastKnown), StoreConfig::default())
    }

    /// The injected remote collaborator.
    pub fn remote(&self) -> &Arc<dyn FolderRemote> {
        &self.remote
    }

    // ── Reads ──────────────────────────────────────────────────

    /// All folders, in remote order.
    pub async fn folders(&self) -> Vec<FolderRecord> {
        self.state.read().await.folders.clone()
    }

    /// One folder by id.
    pub async fn folder(&self, id: FolderId) -> Option<FolderRecord> {
        self.state.read().await.find(id).cloned()
    }

    /// Nested tree of the whole local collection.
    pub async fn tree(&self) -> FolderTree {
        let state = self.state.read().await;
        TreeIndex::with_max_depth(&state.folders, self.config.max_tree_depth).build_tree(None)
    }

    /// Breadcrumb trail from the root to `id`, clamped at the last
    /// resolvable ancestor when the chain is broken.
    pub async fn path_to(&self, id: FolderId) -> Vec<FolderRecord> {
        let state = self.state.read().await;
        TreeIndex::with_max_depth(&state.folders, self.config.max_tree_depth)
            .path_to_clamped(id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Folders that may become the new parent of `id`.
    pub async fn parent_options(&self, id: FolderId) -> Vec<FolderRecord> {
        CycleGuard::parent_options(id, &self.state.read().await.folders)
    }

    /// Currently selected folder.
    pub async fn selected_folder_id(&self) -> Option<FolderId> {
        self.state.read().await.selected_folder_id
    }

    /// Items of the selected folder.
    pub async fn folder_items(&self) -> Vec<ItemRecord> {
        self.state.read().await.folder_items.clone()
    }

    /// Whether folders or items are being loaded.
    pub async fn is_loading(&self) -> bool {
        let state = self.state.read().await;
        state.folders_loading || state.items_loading
    }

    /// Most recent failure, cleared by the next successful folder fetch.
    pub async fn last_error(&self) -> Option<AppError> {
        self.state.read().await.last_error.clone()
    }

    /// Copy of the current folders, selection and items.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&*self.state.read().await)
    }

    // ── Loading ────────────────────────────────────────────────

    /// Replace the local collection with the remote one.
    ///
    /// An unreachable remote is not an error here: existing data is kept
    /// (or an empty store is seeded by the degraded-mode provider) and
    /// [`FetchOutcome::Degraded`] is returned.
    pub async fn fetch_folders(&self) -> AppResult<FetchOutcome> {
        self.state.write().await.folders_loading = true;
        let result = self.remote.list_folders(&FolderFilter::default()).await;

        let mut state = self.state.write().await;
        state.folders_loading = false;
        match result {
            Ok(folders) => {
                let count = folders.len();
                state.folders = folders;
                state.last_error = None;
                debug!(count, "Folders fetched");
                Ok(FetchOutcome::Fresh { count })
            }
            Err(err) if err.is_transport() => {
                if state.folders.is_empty() {
                    if let Some(fallback) = self.degraded.fallback_folders() {
                        state.folders = fallback;
                    }
                }
                warn!(
                    error = %err,
                    provider = self.degraded.name(),
                    kept = state.folders.len(),
                    "Folder fetch failed, serving last known data"
                );
                let reason = err.message.clone();
                state.last_error = Some(err);
                Ok(FetchOutcome::Degraded { reason })
            }
            Err(err) => {
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Query the remote without touching local state.
    pub async fn search_folders(&self, filter: &FolderFilter) -> AppResult<Vec<FolderRecord>> {
        let result = self.remote.list_folders(filter).await;
        self.track(result).await
    }

    /// The remote's precomputed tree, or the locally built one when the
    /// remote is unreachable.
    pub async fn hierarchy(&self) -> AppResult<FolderTree> {
        match self.remote.folder_hierarchy().await {
            Ok(tree) => Ok(tree),
            Err(err) if err.is_transport() => {
                warn!(error = %err, "Hierarchy unavailable, building locally");
                Ok(self.tree().await)
            }
            Err(err) => self.track(Err(err)).await,
        }
    }

    /// Select `id` and load its items.
    pub async fn select_folder(&self, id: FolderId) -> AppResult<FetchOutcome> {
        {
            let mut state = self.state.write().await;
            if let Err(err) = state.require(id) {
                state.last_error = Some(err.clone());
                return Err(err);
            }
            if state.selected_folder_id != Some(id) {
                state.selected_folder_id = Some(id);
                state.folder_items.clear();
            }
        }
        self.refresh_items(&ItemQuery::default()).await
    }

    /// Drop the selection and its items.
    pub async fn clear_selection(&self) {
        let mut state = self.state.write().await;
        state.selected_folder_id = None;
        state.folder_items.clear();
    }

    /// Reload the items of the selected folder.
    pub async fn refresh_items(&self, query: &ItemQuery) -> AppResult<FetchOutcome> {
        let folder_id = {
            let mut state = self.state.write().await;
            let Some(id) = state.selected_folder_id else {
                let err = AppError::validation("No folder selected");
                state.last_error = Some(err.clone());
                return Err(err);
            };
            state.items_loading = true;
            id
        };

        let result = self.remote.folder_items(folder_id, query).await;

        let mut state = self.state.write().await;
        state.items_loading = false;
        match result {
            Ok(page) => {
                let count = page.items.len();
                if state.selected_folder_id == Some(folder_id) {
                    state.folder_items = page.items;
                } else {
                    debug!(folder_id = %folder_id, "Selection changed during item load, discarding");
                }
                Ok(FetchOutcome::Fresh { count })
            }
            Err(err) if err.is_transport() => {
                if state.folder_items.is_empty() && state.selected_folder_id == Some(folder_id) {
                    if let Some(fallback) = self.degraded.fallback_items(folder_id) {
                        state.folder_items = fallback;
                    }
                }
                warn!(folder_id = %folder_id, error = %err, "Item fetch failed, serving last known data");
                let reason = err.message.clone();
                state.last_error = Some(err);
                Ok(FetchOutcome::Degraded { reason })
            }
            Err(err) => {
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    // ── Mutations ──────────────────────────────────────────────

    /// Create a folder, then re-fetch to pick up remote-derived fields.
    pub async fn create_folder(&self, data: CreateFolder) -> AppResult<FolderRecord> {
        let result = self.create_folder_inner(data).await;
        self.track(result).await
    }

    async fn create_folder_inner(&self, mut data: CreateFolder) -> AppResult<FolderRecord> {
        phase("create", None, MutationPhase::Validating);
        data.name = data.name.trim().to_string();
        {
            let state = self.state.read().await;
            let checked = CycleGuard::check_name(&data.name, data.parent_id, &state.folders, None)
                .and_then(|_| state.require_parent(data.parent_id));
            if let Err(err) = checked {
                phase("create", None, MutationPhase::Rejected);
                return Err(err);
            }
        }

        phase("create", None, MutationPhase::RemoteInFlight);
        let created = self.remote.create_folder(&data).await?;
        self.state.write().await.replace(created.clone());
        phase("create", Some(created.id), MutationPhase::Committed);

        info!(folder_id = %created.id, name = %created.name, "Folder created");
        self.reconcile().await;
        Ok(self.folder(created.id).await.unwrap_or(created))
    }

    /// Apply a partial update (rename, reparent, metadata), then re-fetch.
    pub async fn update_folder(&self, id: FolderId, data: UpdateFolder) -> AppResult<FolderRecord> {
        let result = self.update_folder_inner(id, data).await;
        self.track(result).await
    }

    async fn update_folder_inner(&self, id: FolderId, mut data: UpdateFolder) -> AppResult<FolderRecord> {
        phase("update", Some(id), MutationPhase::Validating);
        if let Some(name) = data.name.as_mut() {
            *name = name.trim().to_string();
        }
        {
            let state = self.state.read().await;
            let current = match state.require(id) {
                Ok(folder) => folder,
                Err(err) => {
                    phase("update", Some(id), MutationPhase::Rejected);
                    return Err(err);
                }
            };
            if data.is_empty() {
                return Ok(current.clone());
            }
            if let Err(err) = validate_update(&state, current, &data) {
                phase("update", Some(id), MutationPhase::Rejected);
                return Err(err);
            }
        }

        phase("update", Some(id), MutationPhase::RemoteInFlight);
        let updated = self.remote.update_folder(id, &data).await?;
        self.state.write().await.replace(updated.clone());
        phase("update", Some(id), MutationPhase::Committed);

        info!(folder_id = %id, name = %updated.name, "Folder updated");
        self.reconcile().await;
        Ok(self.folder(id).await.unwrap_or(updated))
    }

    /// Delete a folder.
    ///
    /// Without `move_items_to`, folders with subfolders or items are
    /// refused before anything changes. With a target, subfolders are
    /// reparented under it locally and the remote reassigns the contents.
    pub async fn delete_folder(
        &self,
        id: FolderId,
        move_items_to: Option<FolderId>,
    ) -> AppResult<DeleteOutcome> {
        let result = self.delete_folder_inner(id, move_items_to).await;
        self.track(result).await
    }

    async fn delete_folder_inner(
        &self,
        id: FolderId,
        move_items_to: Option<FolderId>,
    ) -> AppResult<DeleteOutcome> {
        phase("delete", Some(id), MutationPhase::Validating);
        let rollback = {
            let mut state = self.state.write().await;
            if let Err(err) = validate_delete(&state, id, move_items_to) {
                phase("delete", Some(id), MutationPhase::Rejected);
                return Err(err);
            }

            let mut touched = vec![id];
            if move_items_to.is_some() {
                touched.extend(
                    state
                        .folders
                        .iter()
                        .filter(|f| f.parent_id == Some(id))
                        .map(|f| f.id),
                );
            }
            let rollback = Rollback::capture(&state, &touched, true);
            state.folders.retain(|f| f.id != id);
            if let Some(target) = move_items_to {
                for child in state.folders.iter_mut().filter(|f| f.parent_id == Some(id)) {
                    child.parent_id = Some(target);
                }
            }
            if state.selected_folder_id == Some(id) {
                state.selected_folder_id = None;
                state.folder_items.clear();
            }
            rollback
        };
        phase("delete", Some(id), MutationPhase::OptimisticallyApplied);

        phase("delete", Some(id), MutationPhase::RemoteInFlight);
        match self.remote.delete_folder(id, move_items_to).await {
            Ok(()) => {
                phase("delete", Some(id), MutationPhase::Committed);
                info!(folder_id = %id, move_items_to = ?move_items_to, "Folder deleted");
                if move_items_to.is_some() {
                    self.reconcile().await;
                }
                Ok(DeleteOutcome::Committed)
            }
            Err(err) if err.is_transport() => {
                warn!(
                    folder_id = %id,
                    error = %err,
                    "Folder delete not confirmed by remote, keeping local removal"
                );
                let reason = err.message.clone();
                self.state.write().await.last_error = Some(err);
                Ok(DeleteOutcome::LocalOnly { reason })
            }
            Err(err) => {
                rollback.restore(&mut *self.state.write().await);
                phase("delete", Some(id), MutationPhase::RolledBack);
                warn!(folder_id = %id, error = %err, "Folder delete refused, rolled back");
                Err(err)
            }
        }
    }

    /// Clone a folder beside the original.
    ///
    /// When `metadata` is given it is applied to the clone in a second
    /// call. A failure there is logged and returned in
    /// [`CloneOutcome::metadata_error`]; the clone is kept.
    pub async fn clone_folder(
        &self,
        id: FolderId,
        request: CloneFolder,
        metadata: Option<UpdateFolder>,
    ) -> AppResult<CloneOutcome> {
        let result = self.clone_folder_inner(id, request, metadata).await;
        self.track(result).await
    }

    async fn clone_folder_inner(
        &self,
        id: FolderId,
        mut request: CloneFolder,
        metadata: Option<UpdateFolder>,
    ) -> AppResult<CloneOutcome> {
        phase("clone", Some(id), MutationPhase::Validating);
        request.new_name = request.new_name.trim().to_string();
        {
            let state = self.state.read().await;
            let checked = state.require(id).and_then(|source| {
                CycleGuard::check_name(&request.new_name, source.parent_id, &state.folders, None)
            });
            if let Err(err) = checked {
                phase("clone", Some(id), MutationPhase::Rejected);
                return Err(err);
            }
        }

        phase("clone", Some(id), MutationPhase::RemoteInFlight);
        let mut clone = self.remote.clone_folder(id, &request).await?;
        self.state.write().await.replace(clone.clone());
        phase("clone", Some(clone.id), MutationPhase::Committed);
        info!(
            source_id = %id,
            folder_id = %clone.id,
            include_items = request.include_items,
            "Folder cloned"
        );

        let mut metadata_error = None;
        if let Some(mut meta) = metadata.filter(|m| !m.is_empty()) {
            if let Some(name) = meta.name.as_mut() {
                *name = name.trim().to_string();
            }
            match self.apply_clone_metadata(&clone, &meta).await {
                Ok(updated) => clone = updated,
                Err(err) => {
                    warn!(
                        folder_id = %clone.id,
                        error = %err,
                        "Clone created but its metadata could not be applied"
                    );
                    metadata_error = Some(err);
                }
            }
        }

        self.reconcile().await;
        let folder = self.folder(clone.id).await.unwrap_or(clone);
        Ok(CloneOutcome {
            folder,
            metadata_error,
        })
    }

    async fn apply_clone_metadata(
        &self,
        clone: &FolderRecord,
        meta: &UpdateFolder,
    ) -> AppResult<FolderRecord> {
        {
            let state = self.state.read().await;
            validate_update(&state, clone, meta)?;
        }
        let updated = self.remote.update_folder(clone.id, meta).await?;
        self.state.write().await.replace(updated.clone());
        Ok(updated)
    }

    /// Move a folder under `new_parent_id` (`None` for the root).
    ///
    /// The cycle check runs first; a move that would create a cycle never
    /// reaches the remote.
    pub async fn move_folder(
        &self,
        id: FolderId,
        new_parent_id: Option<FolderId>,
    ) -> AppResult<FolderRecord> {
        let result = self.move_folder_inner(id, new_parent_id).await;
        self.track(result).await
    }

    async fn move_folder_inner(
        &self,
        id: FolderId,
        new_parent_id: Option<FolderId>,
    ) -> AppResult<FolderRecord> {
        phase("move", Some(id), MutationPhase::Validating);
        let rollback = {
            let mut state = self.state.write().await;
            let current = match validate_move(&state, id, new_parent_id) {
                Ok(current) => current,
                Err(err) => {
                    phase("move", Some(id), MutationPhase::Rejected);
                    return Err(err);
                }
            };
            if current.parent_id == new_parent_id {
                return Ok(current);
            }

            let rollback = Rollback::capture(&state, &[id], false);
            if let Some(folder) = state.folders.iter_mut().find(|f| f.id == id) {
                folder.parent_id = new_parent_id;
            }
            rollback
        };
        phase("move", Some(id), MutationPhase::OptimisticallyApplied);

        phase("move", Some(id), MutationPhase::RemoteInFlight);
        match self.remote.move_folder(id, new_parent_id).await {
            Ok(moved) => {
                self.state.write().await.replace(moved.clone());
                phase("move", Some(id), MutationPhase::Committed);
                info!(folder_id = %id, new_parent = ?new_parent_id, "Folder moved");
                Ok(moved)
            }
            Err(err) => {
                rollback.restore(&mut *self.state.write().await);
                phase("move", Some(id), MutationPhase::RolledBack);
                warn!(folder_id = %id, error = %err, "Folder move failed, rolled back");
                Err(err)
            }
        }
    }

    // ── Pass-through ───────────────────────────────────────────

    /// Change history of a folder.
    pub async fn folder_history(
        &self,
        id: FolderId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FolderHistoryEntry>> {
        let result = self.remote.folder_history(id, page).await;
        self.track(result).await
    }

    /// Permission grants on a folder.
    pub async fn folder_permissions(&self, id: FolderId) -> AppResult<Vec<FolderPermission>> {
        let result = self.remote.folder_permissions(id).await;
        self.track(result).await
    }

    /// Replace the permission grants on a folder.
    pub async fn set_folder_permissions(
        &self,
        id: FolderId,
        permissions: &[FolderPermission],
    ) -> AppResult<Vec<FolderPermission>> {
        let result = self.remote.set_folder_permissions(id, permissions).await;
        self.track(result).await
    }

    /// Alerts configured on a folder.
    pub async fn folder_alerts(&self, id: FolderId) -> AppResult<Vec<FolderAlert>> {
        let result = self.remote.folder_alerts(id).await;
        self.track(result).await
    }

    /// Replace the alerts configured on a folder.
    pub async fn set_folder_alerts(
        &self,
        id: FolderId,
        alerts: &[FolderAlert],
    ) -> AppResult<Vec<FolderAlert>> {
        let result = self.remote.set_folder_alerts(id, alerts).await;
        self.track(result).await
    }

    /// Label templates attached to a folder.
    pub async fn folder_labels(&self, id: FolderId) -> AppResult<Vec<FolderLabel>> {
        let result = self.remote.folder_labels(id).await;
        self.track(result).await
    }

    /// Replace the label templates attached to a folder.
    pub async fn set_folder_labels(
        &self,
        id: FolderId,
        labels: &[FolderLabel],
    ) -> AppResult<Vec<FolderLabel>> {
        let result = self.remote.set_folder_labels(id, labels).await;
        self.track(result).await
    }

    // ── Helpers ────────────────────────────────────────────────

    /// Record a failure as the store's last error and pass the result on.
    async fn track<T>(&self, result: AppResult<T>) -> AppResult<T> {
        if let Err(err) = &result {
            self.state.write().await.last_error = Some(err.clone());
        }
        result
    }

    /// Re-fetch after a committed mutation. Failures are logged only; the
    /// mutation itself already succeeded.
    async fn reconcile(&self) {
        match self.fetch_folders().await {
            Ok(FetchOutcome::Fresh { .. }) => {}
            Ok(FetchOutcome::Degraded { reason }) => {
                warn!(reason = %reason, "Re-fetch after mutation degraded");
            }
            Err(err) => {
                warn!(error = %err, "Re-fetch after mutation failed");
            }
        }
    }
}

fn phase(operation: &'static str, folder_id: Option<FolderId>, phase: MutationPhase) {
    match folder_id {
        Some(id) => debug!(operation, folder_id = %id, phase = %phase, "Folder mutation"),
        None => debug!(operation, phase = %phase, "Folder mutation"),
    }
}

fn validate_update(state: &StoreState, current: &FolderRecord, data: &UpdateFolder) -> AppResult<()> {
    let new_parent = data.parent_id.unwrap_or(current.parent_id);
    let parent_changed = new_parent != current.parent_id;

    if parent_changed {
        CycleGuard::check_move(current.id, new_parent, &state.folders)?;
        state.require_parent(new_parent)?;
    }
    if parent_changed || data.name.is_some() {
        let name = data.name.as_deref().unwrap_or(&current.name);
        CycleGuard::check_name(name, new_parent, &state.folders, Some(current.id))?;
    }
    Ok(())
}

fn validate_delete(
    state: &StoreState,
    id: FolderId,
    move_items_to: Option<FolderId>,
) -> AppResult<()> {
    let folder = state.require(id)?;
    let index = TreeIndex::new(&state.folders);

    match move_items_to {
        Some(target) => {
            if target == id || index.is_descendant(id, target) {
                return Err(AppError::validation(
                    "Cannot move contents into the folder being deleted or one of its subfolders",
                ));
            }
            if !index.contains(target) {
                return Err(AppError::not_found(format!(
                    "Destination folder {target} not found"
                )));
            }
            for child in index.children_of(Some(id)) {
                CycleGuard::check_name(&child.name, Some(target), &state.folders, Some(child.id))?;
            }
        }
        None => {
            if !index.children_of(Some(id)).is_empty() {
                return Err(AppError::has_children(format!(
                    "Folder '{}' has subfolders; choose where to move them",
                    folder.name
                )));
            }
            if folder.has_items() {
                return Err(AppError::has_items(format!(
                    "Folder '{}' contains {} items; choose where to move them",
                    folder.name, folder.item_count
                )));
            }
        }
    }
    Ok(())
}

fn validate_move(
    state: &StoreState,
    id: FolderId,
    new_parent_id: Option<FolderId>,
) -> AppResult<FolderRecord> {
    let current = state.require(id)?.clone();
    CycleGuard::check_move(id, new_parent_id, &state.folders)?;
    state.require_parent(new_parent_id)?;
    if current.parent_id != new_parent_id {
        CycleGuard::check_name(&current.name, new_parent_id, &state.folders, Some(id))?;
    }
    Ok(current)
}
