//! Point-in-time copies of the store's mutable state.

use stockroom_core::types::FolderId;
use stockroom_entity::folder::FolderRecord;
use stockroom_entity::item::ItemRecord;

use super::store::StoreState;

/// Read-only copy of the store's folders, selection and items.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    folders: Vec<FolderRecord>,
    selected_folder_id: Option<FolderId>,
    folder_items: Vec<ItemRecord>,
}

impl Snapshot {
    pub(crate) fn capture(state: &StoreState) -> Self {
        Self {
            folders: state.folders.clone(),
            selected_folder_id: state.selected_folder_id,
            folder_items: state.folder_items.clone(),
        }
    }

    /// Folders at capture time.
    pub fn folders(&self) -> &[FolderRecord] {
        &self.folders
    }

    /// Selected folder at capture time.
    pub fn selected_folder_id(&self) -> Option<FolderId> {
        self.selected_folder_id
    }

    /// Items of the selected folder at capture time.
    pub fn folder_items(&self) -> &[ItemRecord] {
        &self.folder_items
    }
}

/// Prior values of the records one optimistic mutation touches.
///
/// Restoring puts those records back in place and leaves every other
/// record alone, so changes committed meanwhile to other folders survive
/// a rollback.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Rollback {
    /// Touched records with their positions, in ascending position order.
    records: Vec<(usize, FolderRecord)>,
    /// Selection and its items, kept only when the mutation clears them.
    selection: Option<(FolderId, Vec<ItemRecord>)>,
}

impl Rollback {
    /// Remember the records in `ids`, plus the selection when it is one of
    /// them and `clears_selection` is set.
    pub(crate) fn capture(state: &StoreState, ids: &[FolderId], clears_selection: bool) -> Self {
        let records = state
            .folders
            .iter()
            .enumerate()
            .filter(|(_, f)| ids.contains(&f.id))
            .map(|(index, f)| (index, f.clone()))
            .collect();
        let selection = state
            .selected_folder_id
            .filter(|id| clears_selection && ids.contains(id))
            .map(|id| (id, state.folder_items.clone()));
        Self { records, selection }
    }

    pub(crate) fn restore(self, state: &mut StoreState) {
        for (index, record) in self.records {
            match state.folders.iter_mut().find(|f| f.id == record.id) {
                Some(slot) => *slot = record,
                None => {
                    let at = index.min(state.folders.len());
                    state.folders.insert(at, record);
                }
            }
        }
        // A selection made while the call was in flight wins.
        if let Some((id, items)) = self.selection {
            if state.selected_folder_id.is_none() {
                state.selected_folder_id = Some(id);
                state.folder_items = items;
            }
        }
    }
}
