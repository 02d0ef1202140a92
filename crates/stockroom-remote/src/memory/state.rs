//! Server-side rules of the in-memory folder service.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use stockroom_core::error::AppError;
use stockroom_core::result::AppResult;
use stockroom_core::types::{FolderId, ItemId, PageRequest, PageResponse};
use stockroom_entity::folder::model::normalize_name;
use stockroom_entity::folder::{
    CloneFolder, CreateFolder, FolderAlert, FolderFilter, FolderHistoryEntry, FolderLabel,
    FolderPermission, FolderRecord, FolderTree, UpdateFolder,
};
use stockroom_entity::item::{ItemPatch, ItemQuery, ItemRecord};
use stockroom_service::folder::{CycleGuard, TreeIndex};

/// Seed data for the in-memory service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    /// Initial folders.
    #[serde(default)]
    pub folders: Vec<FolderRecord>,
    /// Initial items.
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

/// Everything the in-memory service stores.
#[derive(Debug, Default)]
pub(crate) struct ServiceState {
    pub(crate) folders: Vec<FolderRecord>,
    pub(crate) items: Vec<ItemRecord>,
    history: HashMap<FolderId, Vec<FolderHistoryEntry>>,
    permissions: HashMap<FolderId, Vec<FolderPermission>>,
    alerts: HashMap<FolderId, Vec<FolderAlert>>,
    labels: HashMap<FolderId, Vec<FolderLabel>>,
}

impl ServiceState {
    pub(crate) fn from_seed(seed: Seed) -> Self {
        let mut state = Self {
            folders: seed.folders,
            items: seed.items,
            ..Self::default()
        };
        state.recount();
        state
    }

    pub(crate) fn list(&self, filter: &FolderFilter) -> Vec<FolderRecord> {
        let search = filter.search.as_deref().map(normalize_name);
        self.folders
            .iter()
            .filter(|f| filter.parent_id.is_none() || f.parent_id == filter.parent_id)
            .filter(|f| {
                search
                    .as_deref()
                    .is_none_or(|s| normalize_name(&f.name).contains(s))
            })
            .filter(|f| filter.tags.iter().all(|t| f.tags.contains(t)))
            .cloned()
            .collect()
    }

    pub(crate) fn hierarchy(&self) -> FolderTree {
        TreeIndex::new(&self.folders).build_tree(None)
    }

    pub(crate) fn items_page(
        &self,
        folder_id: FolderId,
        query: &ItemQuery,
    ) -> AppResult<PageResponse<ItemRecord>> {
        self.require(folder_id)?;
        let search = query.search.as_deref().map(normalize_name);
        let matching: Vec<&ItemRecord> = self
            .items
            .iter()
            .filter(|i| i.folder_id == Some(folder_id))
            .filter(|i| {
                search
                    .as_deref()
                    .is_none_or(|s| normalize_name(&i.name).contains(s))
            })
            .collect();
        Ok(paginate(matching, &query.page))
    }

    pub(crate) fn create(&mut self, data: &CreateFolder) -> AppResult<FolderRecord> {
        let name = data.name.trim();
        self.require_parent(data.parent_id)?;
        CycleGuard::check_name(name, data.parent_id, &self.folders, None)?;

        let mut folder = FolderRecord::new(FolderId::new(), name, data.parent_id);
        folder.description = data.description.clone();
        folder.notes = data.notes.clone();
        folder.tags = data.tags.clone();
        folder.images = data.images.clone();
        self.folders.push(folder.clone());
        self.record(folder.id, "created", json!({ "name": folder.name }));
        Ok(folder)
    }

    pub(crate) fn update(&mut self, id: FolderId, data: &UpdateFolder) -> AppResult<FolderRecord> {
        let current = self.require(id)?.clone();
        let parent_id = data.parent_id.unwrap_or(current.parent_id);
        let name = data
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or(&current.name)
            .to_string();

        if parent_id != current.parent_id {
            CycleGuard::check_move(id, parent_id, &self.folders)?;
            self.require_parent(parent_id)?;
        }
        CycleGuard::check_name(&name, parent_id, &self.folders, Some(id))?;

        let mut changed = Vec::new();
        let mut folder = current;
        if folder.name != name {
            folder.name = name;
            changed.push("name");
        }
        if folder.parent_id != parent_id {
            folder.parent_id = parent_id;
            changed.push("parentId");
        }
        if let Some(description) = &data.description {
            folder.description = Some(description.clone());
            changed.push("description");
        }
        if let Some(notes) = &data.notes {
            folder.notes = Some(notes.clone());
            changed.push("notes");
        }
        if let Some(tags) = &data.tags {
            folder.tags = tags.clone();
            changed.push("tags");
        }
        if let Some(images) = &data.images {
            folder.images = images.clone();
            changed.push("images");
        }
        folder.updated_at = Utc::now();

        self.store(folder.clone());
        self.record(id, "updated", json!({ "fields": changed }));
        Ok(folder)
    }

    pub(crate) fn delete(&mut self, id: FolderId, move_items_to: Option<FolderId>) -> AppResult<()> {
        let folder = self.require(id)?.clone();
        let has_children = self.folders.iter().any(|f| f.parent_id == Some(id));
        let has_items = self.items.iter().any(|i| i.folder_id == Some(id));

        match move_items_to {
            Some(target) => {
                if target == id || TreeIndex::new(&self.folders).is_descendant(id, target) {
                    return Err(AppError::validation(
                        "Contents cannot be moved into the folder being deleted",
                    ));
                }
                self.require(target).map_err(|_| {
                    AppError::not_found(format!("Destination folder {target} not found"))
                })?;
                for child in self.folders.iter().filter(|f| f.parent_id == Some(id)) {
                    CycleGuard::check_name(&child.name, Some(target), &self.folders, Some(child.id))?;
                }
                for child in self.folders.iter_mut().filter(|f| f.parent_id == Some(id)) {
                    child.parent_id = Some(target);
                }
                for item in self.items.iter_mut().filter(|i| i.folder_id == Some(id)) {
                    item.folder_id = Some(target);
                }
                self.record(target, "contents_received", json!({ "from": folder.name }));
            }
            None if has_children => {
                return Err(AppError::has_children(format!(
                    "Folder '{}' has subfolders",
                    folder.name
                )));
            }
            None if has_items => {
                return Err(AppError::has_items(format!(
                    "Folder '{}' contains items",
                    folder.name
                )));
            }
            None => {}
        }

        self.folders.retain(|f| f.id != id);
        self.history.remove(&id);
        self.permissions.remove(&id);
        self.alerts.remove(&id);
        self.labels.remove(&id);
        self.recount();
        Ok(())
    }

    pub(crate) fn clone_folder(&mut self, id: FolderId, request: &CloneFolder) -> AppResult<FolderRecord> {
        let source = self.require(id)?.clone();
        let name = request.new_name.trim();
        CycleGuard::check_name(name, source.parent_id, &self.folders, None)?;

        let now = Utc::now();
        let clone = FolderRecord {
            id: FolderId::new(),
            name: name.to_string(),
            item_count: 0,
            total_value: 0.0,
            created_at: now,
            updated_at: now,
            ..source
        };
        self.folders.push(clone.clone());

        if request.include_items {
            let copies: Vec<ItemRecord> = self
                .items
                .iter()
                .filter(|i| i.folder_id == Some(id))
                .map(|i| ItemRecord {
                    id: ItemId::new(),
                    folder_id: Some(clone.id),
                    updated_at: now,
                    ..i.clone()
                })
                .collect();
            self.items.extend(copies);
            self.recount();
        }
        self.record(
            clone.id,
            "cloned",
            json!({ "source": id, "includeItems": request.include_items }),
        );
        self.require(clone.id).cloned()
    }

    pub(crate) fn move_folder(
        &mut self,
        id: FolderId,
        new_parent_id: Option<FolderId>,
    ) -> AppResult<FolderRecord> {
        let mut folder = self.require(id)?.clone();
        CycleGuard::check_move(id, new_parent_id, &self.folders)?;
        self.require_parent(new_parent_id)?;
        CycleGuard::check_name(&folder.name, new_parent_id, &self.folders, Some(id))?;

        let from = folder.parent_id;
        folder.parent_id = new_parent_id;
        folder.updated_at = Utc::now();
        self.store(folder.clone());
        self.record(id, "moved", json!({ "from": from, "to": new_parent_id }));
        Ok(folder)
    }

    /// All-or-nothing: an unknown item or destination changes nothing.
    pub(crate) fn bulk_update(&mut self, item_ids: &[ItemId], patch: &ItemPatch) -> AppResult<()> {
        if let Some(target) = patch.folder_id {
            self.require(target)?;
        }
        if let Some(missing) = item_ids
            .iter()
            .find(|id| !self.items.iter().any(|i| i.id == **id))
        {
            return Err(AppError::not_found(format!("Item {missing} not found")));
        }

        let now = Utc::now();
        for item in self.items.iter_mut().filter(|i| item_ids.contains(&i.id)) {
            item.folder_id = patch.folder_id;
            item.updated_at = now;
        }
        self.recount();
        if let Some(target) = patch.folder_id {
            self.record(target, "items_added", json!({ "count": item_ids.len() }));
        }
        Ok(())
    }

    pub(crate) fn history(
        &self,
        id: FolderId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FolderHistoryEntry>> {
        self.require(id)?;
        let entries: Vec<&FolderHistoryEntry> = self
            .history
            .get(&id)
            .map(|h| h.iter().rev().collect())
            .unwrap_or_default();
        Ok(paginate(entries, page))
    }

    pub(crate) fn permissions(&self, id: FolderId) -> AppResult<Vec<FolderPermission>> {
        self.require(id)?;
        Ok(self.permissions.get(&id).cloned().unwrap_or_default())
    }

    pub(crate) fn set_permissions(
        &mut self,
        id: FolderId,
        permissions: &[FolderPermission],
    ) -> AppResult<Vec<FolderPermission>> {
        self.require(id)?;
        self.permissions.insert(id, permissions.to_vec());
        self.record(id, "permissions_changed", json!({ "count": permissions.len() }));
        Ok(permissions.to_vec())
    }

    pub(crate) fn alerts(&self, id: FolderId) -> AppResult<Vec<FolderAlert>> {
        self.require(id)?;
        Ok(self.alerts.get(&id).cloned().unwrap_or_default())
    }

    pub(crate) fn set_alerts(&mut self, id: FolderId, alerts: &[FolderAlert]) -> AppResult<Vec<FolderAlert>> {
        self.require(id)?;
        self.alerts.insert(id, alerts.to_vec());
        Ok(alerts.to_vec())
    }

    pub(crate) fn labels(&self, id: FolderId) -> AppResult<Vec<FolderLabel>> {
        self.require(id)?;
        Ok(self.labels.get(&id).cloned().unwrap_or_default())
    }

    pub(crate) fn set_labels(&mut self, id: FolderId, labels: &[FolderLabel]) -> AppResult<Vec<FolderLabel>> {
        self.require(id)?;
        self.labels.insert(id, labels.to_vec());
        Ok(labels.to_vec())
    }

    fn require(&self, id: FolderId) -> AppResult<&FolderRecord> {
        self.folders
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    fn require_parent(&self, parent_id: Option<FolderId>) -> AppResult<()> {
        match parent_id {
            Some(id) => self
                .require(id)
                .map(|_| ())
                .map_err(|_| AppError::not_found(format!("Parent folder {id} not found"))),
            None => Ok(()),
        }
    }

    fn store(&mut self, folder: FolderRecord) {
        if let Some(slot) = self.folders.iter_mut().find(|f| f.id == folder.id) {
            *slot = folder;
        }
    }

    fn record(&mut self, folder_id: FolderId, action: &str, details: serde_json::Value) {
        self.history
            .entry(folder_id)
            .or_default()
            .push(FolderHistoryEntry {
                folder_id,
                action: action.to_string(),
                actor: None,
                details,
                occurred_at: Utc::now(),
            });
    }

    /// Derive item counts and values from the stored items.
    fn recount(&mut self) {
        let mut totals: HashMap<FolderId, (u64, f64)> = HashMap::new();
        for item in &self.items {
            if let Some(folder_id) = item.folder_id {
                let entry = totals.entry(folder_id).or_default();
                entry.0 += 1;
                entry.1 += item.value * item.quantity as f64;
            }
        }
        for folder in &mut self.folders {
            let (count, value) = totals.get(&folder.id).copied().unwrap_or_default();
            folder.item_count = count;
            folder.total_value = value;
        }
    }
}

fn paginate<T: Clone>(all: Vec<&T>, page: &PageRequest) -> PageResponse<T> {
    let total = all.len() as u64;
    let items = all
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    PageResponse::new(items, page.page, page.page_size, total)
}
