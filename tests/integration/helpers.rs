//! Shared test helpers for integration tests.

use std::sync::Arc;

use stockroom_core::config::relocate::RelocateConfig;
use stockroom_core::config::store::StoreConfig;
use stockroom_core::types::{FolderId, ItemId};
use stockroom_entity::folder::FolderRecord;
use stockroom_entity::item::ItemRecord;
use stockroom_remote::InMemoryFolderRemote;
use stockroom_service::folder::{DegradedModeProvider, FolderStore, KeepLastKnown};
use stockroom_service::preferences::MemoryPreferenceStore;
use stockroom_service::relocate::{BulkRelocator, RecentFolders};

/// Test application context
pub struct TestApp {
    /// Handle on the remote for inspection and fault injection
    pub remote: InMemoryFolderRemote,
    /// Store under test, already fetched once
    pub store: Arc<FolderStore>,
    /// Relocator sharing the same remote
    pub relocator: BulkRelocator,
}

impl TestApp {
    /// A loaded store over `folders` and `items`.
    pub async fn new(folders: Vec<FolderRecord>, items: Vec<ItemRecord>) -> Self {
        Self::with_degraded(folders, items, Arc::new(KeepLastKnown)).await
    }

    /// Like [`TestApp::new`] with a specific degraded-mode provider.
    pub async fn with_degraded(
        folders: Vec<FolderRecord>,
        items: Vec<ItemRecord>,
        degraded: Arc<dyn DegradedModeProvider>,
    ) -> Self {
        let remote = InMemoryFolderRemote::with_data(folders, items);
        let store = Arc::new(FolderStore::new(
            Arc::new(remote.clone()),
            degraded,
            StoreConfig::default(),
        ));
        store.fetch_folders().await.expect("initial fetch");

        let recent = RecentFolders::new(Arc::new(MemoryPreferenceStore::new()), 5);
        let relocator = BulkRelocator::new(
            Arc::new(remote.clone()),
            recent,
            &RelocateConfig::default(),
        );

        Self {
            remote,
            store,
            relocator,
        }
    }
}

/// Root -> A -> B, with Supplies beside A and Office at the top level.
pub struct Hierarchy {
    pub root: FolderRecord,
    pub a: FolderRecord,
    pub b: FolderRecord,
    pub supplies: FolderRecord,
    pub office: FolderRecord,
}

impl Hierarchy {
    pub fn new() -> Self {
        let root = FolderRecord::new(FolderId::new(), "Root", None);
        let a = FolderRecord::new(FolderId::new(), "A", Some(root.id));
        let b = FolderRecord::new(FolderId::new(), "B", Some(a.id));
        let supplies = FolderRecord::new(FolderId::new(), "Supplies", Some(root.id));
        let office = FolderRecord::new(FolderId::new(), "Office", None);
        Self {
            root,
            a,
            b,
            supplies,
            office,
        }
    }

    pub fn folders(&self) -> Vec<FolderRecord> {
        vec![
            self.root.clone(),
            self.a.clone(),
            self.b.clone(),
            self.supplies.clone(),
            self.office.clone(),
        ]
    }
}

/// `count` items named `Item N` in `folder_id`.
pub fn items_in(folder_id: Option<FolderId>, count: usize) -> Vec<ItemRecord> {
    (0..count)
        .map(|n| ItemRecord::new(ItemId::new(), format!("Item {n}"), folder_id))
        .collect()
}

pub fn ids(items: &[ItemRecord]) -> Vec<ItemId> {
    items.iter().map(|i| i.id).collect()
}
