//! Bulk relocation and recently used destinations.

use std::sync::Arc;

use stockroom_core::config::relocate::RelocateConfig;
use stockroom_core::error::AppError;
use stockroom_core::types::FolderId;
use stockroom_entity::folder::FolderRecord;
use stockroom_remote::Operation;
use stockroom_service::preferences::FilePreferenceStore;
use stockroom_service::relocate::{BulkRelocator, RecentFolders, RelocateProgress, RelocateStatus};

use crate::helpers::{Hierarchy, TestApp, ids, items_in};

#[tokio::test]
async fn test_failed_middle_batch_is_partial_success() {
    let h = Hierarchy::new();
    let items = items_in(None, 45);
    let app = TestApp::new(h.folders(), items.clone()).await;
    app.remote.fail_nth(
        Operation::BulkUpdateItems,
        2,
        AppError::external_service("bulk update rejected"),
    );

    let mut progress: Vec<RelocateProgress> = Vec::new();
    let report = app
        .relocator
        .relocate_with_progress(&ids(&items), Some(h.office.id), |p| progress.push(p))
        .await;

    assert_eq!(report.batch_count, 3);
    assert_eq!(report.completed, 25);
    assert_eq!(report.failed(), 20);
    assert_eq!(report.status, RelocateStatus::PartialSuccess);
    assert_eq!(report.failed_items, ids(&items[20..40]));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].batch_index, 1);
    assert_eq!(report.errors[0].item_count, 20);

    let processed: Vec<usize> = progress.iter().map(|p| p.processed).collect();
    let percents: Vec<u8> = progress.iter().map(|p| p.percent).collect();
    assert_eq!(processed, vec![20, 40, 45]);
    assert_eq!(percents, vec![44, 89, 100]);
    assert_eq!(app.remote.call_count(Operation::BulkUpdateItems), 3);

    let moved = app
        .remote
        .stored_items()
        .await
        .into_iter()
        .filter(|i| i.folder_id == Some(h.office.id))
        .count();
    assert_eq!(moved, 25);
    assert_eq!(app.relocator.recent().list().await, vec![h.office.id]);
}

#[tokio::test]
async fn test_batch_boundaries() {
    let h = Hierarchy::new();
    for (count, batches) in [(0, 0), (1, 1), (20, 1), (21, 2), (40, 2)] {
        let items = items_in(None, count);
        let app = TestApp::new(h.folders(), items.clone()).await;

        let report = app.relocator.relocate(&ids(&items), Some(h.supplies.id)).await;
        assert_eq!(report.batch_count, batches, "{count} items");
        assert_eq!(report.completed + report.failed(), count);
        assert_eq!(report.status, RelocateStatus::AllSucceeded);
        assert_eq!(
            app.remote.call_count(Operation::BulkUpdateItems),
            batches as u64
        );
    }
}

#[tokio::test]
async fn test_empty_selection_leaves_recent_untouched() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    let report = app.relocator.relocate(&[], Some(h.office.id)).await;
    assert_eq!(report.total, 0);
    assert!(app.relocator.recent().list().await.is_empty());
}

#[tokio::test]
async fn test_every_batch_failing_is_all_failed() {
    let h = Hierarchy::new();
    let items = items_in(None, 30);
    let app = TestApp::new(h.folders(), items.clone()).await;
    app.remote.set_offline(true);

    let report = app.relocator.relocate(&ids(&items), Some(h.a.id)).await;
    assert_eq!(report.status, RelocateStatus::AllFailed);
    assert_eq!(report.completed, 0);
    assert_eq!(report.errors.len(), 2);
    assert!(app.relocator.recent().list().await.is_empty());
}

#[tokio::test]
async fn test_relocating_to_root_unassigns_items() {
    let h = Hierarchy::new();
    let items = items_in(Some(h.b.id), 3);
    let app = TestApp::new(h.folders(), items.clone()).await;

    let report = app.relocator.relocate(&ids(&items), None).await;
    assert_eq!(report.status, RelocateStatus::AllSucceeded);
    assert!(app
        .remote
        .stored_items()
        .await
        .iter()
        .all(|i| i.folder_id.is_none()));
    assert!(app.relocator.recent().list().await.is_empty());
}

#[tokio::test]
async fn test_recent_destinations_keep_last_five() {
    let destinations: Vec<FolderRecord> = (0..6)
        .map(|n| FolderRecord::new(FolderId::new(), format!("Bin {n}"), None))
        .collect();
    let items = items_in(None, 1);
    let app = TestApp::new(destinations.clone(), items.clone()).await;

    for folder in &destinations {
        app.relocator.relocate(&ids(&items), Some(folder.id)).await;
    }

    let expected: Vec<FolderId> = destinations.iter().rev().take(5).map(|f| f.id).collect();
    assert_eq!(app.relocator.recent().list().await, expected);

    app.relocator
        .relocate(&ids(&items), Some(destinations[3].id))
        .await;
    let recent = app.relocator.recent().list().await;
    assert_eq!(recent[0], destinations[3].id);
    assert_eq!(recent.len(), 5);
}

#[tokio::test]
async fn test_recent_destinations_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let h = Hierarchy::new();
    let items = items_in(None, 2);
    let app = TestApp::new(h.folders(), items.clone()).await;

    let store = FilePreferenceStore::new(dir.path()).await.unwrap();
    let relocator = BulkRelocator::new(
        Arc::new(app.remote.clone()),
        RecentFolders::new(Arc::new(store), 5),
        &RelocateConfig::default(),
    );
    relocator.relocate(&ids(&items), Some(h.supplies.id)).await;
    relocator.relocate(&ids(&items), Some(h.office.id)).await;

    let reopened = FilePreferenceStore::new(dir.path()).await.unwrap();
    let recent = RecentFolders::new(Arc::new(reopened), 5);
    assert_eq!(recent.list().await, vec![h.office.id, h.supplies.id]);
}
