//! Folder store behaviour against the in-memory remote.

use std::sync::Arc;

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::types::FolderId;
use stockroom_entity::folder::{
    CloneFolder, CreateFolder, FolderPermission, FolderRecord, UpdateFolder,
};
use stockroom_entity::item::ItemPatch;
use stockroom_remote::Operation;
use stockroom_service::FolderRemote;
use stockroom_service::folder::{DeleteOutcome, FetchOutcome, StaticFallback, TreeIndex};

use crate::helpers::{Hierarchy, TestApp, ids, items_in};

#[tokio::test]
async fn test_move_to_root_parent_detaches_subtree() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    let moved = app.store.move_folder(h.b.id, Some(h.root.id)).await.unwrap();
    assert_eq!(moved.parent_id, Some(h.root.id));

    let folders = app.store.folders().await;
    let index = TreeIndex::new(&folders);
    assert!(!index.descendants_of(h.a.id).contains(&h.b.id));
    assert_eq!(app.store.folder(h.b.id).await.unwrap().parent_id, Some(h.root.id));

    let remote_b = app
        .remote
        .stored_folders()
        .await
        .into_iter()
        .find(|f| f.id == h.b.id)
        .unwrap();
    assert_eq!(remote_b.parent_id, Some(h.root.id));
}

#[tokio::test]
async fn test_cycle_move_is_rejected_before_remote() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;
    let before = app.store.snapshot().await;

    let err = app.store.move_folder(h.a.id, Some(h.b.id)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);
    assert_eq!(app.store.folder(h.a.id).await.unwrap().parent_id, Some(h.root.id));
    assert_eq!(app.store.snapshot().await, before);
    assert_eq!(app.remote.call_count(Operation::MoveFolder), 0);

    let err = app.store.move_folder(h.a.id, Some(h.a.id)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);
    assert_eq!(app.store.last_error().await.map(|e| e.kind), Some(ErrorKind::Cycle));
}

#[tokio::test]
async fn test_create_duplicate_sibling_is_conflict() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    for name in ["Supplies", "supplies", "  SUPPLIES "] {
        let err = app
            .store
            .create_folder(CreateFolder::named(name, Some(h.root.id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict, "name {name:?}");
    }
    assert_eq!(app.store.folders().await.len(), 5);
    assert_eq!(app.remote.call_count(Operation::CreateFolder), 0);

    let created = app
        .store
        .create_folder(CreateFolder::named("Supplies", Some(h.office.id)))
        .await
        .unwrap();
    assert_eq!(created.parent_id, Some(h.office.id));
    assert_eq!(app.store.folders().await.len(), 6);
}

#[tokio::test]
async fn test_create_rejects_empty_name_and_reconciles() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    let err = app
        .store
        .create_folder(CreateFolder::named("   ", None))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let lists_before = app.remote.call_count(Operation::ListFolders);
    let created = app
        .store
        .create_folder(CreateFolder::named("  Bins ", Some(h.supplies.id)))
        .await
        .unwrap();
    assert_eq!(created.name, "Bins");
    assert_eq!(app.remote.call_count(Operation::ListFolders), lists_before + 1);
    assert_eq!(app.store.path_to(created.id).await.len(), 3);
}

#[tokio::test]
async fn test_delete_folder_with_items_is_refused() {
    let h = Hierarchy::new();
    let items = items_in(Some(h.supplies.id), 3);
    let app = TestApp::new(h.folders(), items).await;
    assert_eq!(app.store.folder(h.supplies.id).await.unwrap().item_count, 3);

    let err = app.store.delete_folder(h.supplies.id, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::HasItems);
    assert!(app.store.folder(h.supplies.id).await.is_some());
    assert_eq!(app.remote.call_count(Operation::DeleteFolder), 0);

    let err = app.store.delete_folder(h.a.id, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::HasChildren);
}

#[tokio::test]
async fn test_delete_refused_remotely_restores_snapshot() {
    let h = Hierarchy::new();
    let loose = items_in(None, 2);
    let app = TestApp::new(h.folders(), loose.clone()).await;

    // The remote gains items the store has not seen yet.
    app.remote
        .bulk_update_items(&ids(&loose), &ItemPatch {
            folder_id: Some(h.office.id),
        })
        .await
        .unwrap();

    let before = app.store.snapshot().await;
    let err = app.store.delete_folder(h.office.id, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::HasItems);
    assert_eq!(app.store.snapshot().await, before);
    assert_eq!(app.remote.call_count(Operation::DeleteFolder), 1);
}

#[tokio::test]
async fn test_delete_under_transport_failure_stays_local() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;
    app.remote.set_offline(true);

    let outcome = app.store.delete_folder(h.b.id, None).await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::LocalOnly { .. }));
    assert!(app.store.folder(h.b.id).await.is_none());
    assert!(app.store.last_error().await.unwrap().is_transport());

    app.remote.set_offline(false);
    assert!(app.remote.stored_folders().await.iter().any(|f| f.id == h.b.id));
}

#[tokio::test]
async fn test_delete_with_destination_moves_contents() {
    let h = Hierarchy::new();
    let items = items_in(Some(h.a.id), 2);
    let app = TestApp::new(h.folders(), items).await;

    let outcome = app
        .store
        .delete_folder(h.a.id, Some(h.office.id))
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Committed);
    assert!(app.store.folder(h.a.id).await.is_none());
    assert_eq!(app.store.folder(h.b.id).await.unwrap().parent_id, Some(h.office.id));
    assert_eq!(app.store.folder(h.office.id).await.unwrap().item_count, 2);
}

#[tokio::test]
async fn test_delete_into_own_subtree_is_validation() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    for target in [h.a.id, h.b.id] {
        let err = app.store.delete_folder(h.a.id, Some(target)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
    assert_eq!(app.remote.call_count(Operation::DeleteFolder), 0);
}

#[tokio::test]
async fn test_failed_move_rolls_back_exactly() {
    let h = Hierarchy::new();
    let items = items_in(Some(h.b.id), 2);
    let app = TestApp::new(h.folders(), items).await;
    app.store.select_folder(h.b.id).await.unwrap();
    let before = app.store.snapshot().await;

    app.remote
        .fail_nth(Operation::MoveFolder, 1, AppError::internal("database locked"));
    let err = app.store.move_folder(h.b.id, Some(h.office.id)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(app.store.snapshot().await, before);

    app.remote.set_offline(true);
    let err = app.store.move_folder(h.b.id, None).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(app.store.snapshot().await, before);
}

#[tokio::test]
async fn test_update_checks_names_and_cycles() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    let same = app
        .store
        .update_folder(h.a.id, UpdateFolder::rename("a"))
        .await
        .unwrap();
    assert_eq!(same.name, "a");

    let err = app
        .store
        .update_folder(h.a.id, UpdateFolder::rename("Supplies"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let reparent = UpdateFolder {
        parent_id: Some(Some(h.b.id)),
        ..UpdateFolder::default()
    };
    let err = app.store.update_folder(h.a.id, reparent).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);

    let to_root = UpdateFolder {
        parent_id: Some(None),
        description: Some("Top level now".to_string()),
        ..UpdateFolder::default()
    };
    let updated = app.store.update_folder(h.b.id, to_root).await.unwrap();
    assert!(updated.is_root());
    assert_eq!(updated.description.as_deref(), Some("Top level now"));
    assert_eq!(app.remote.call_count(Operation::UpdateFolder), 2);
}

#[tokio::test]
async fn test_update_missing_folder_is_not_found() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;
    let err = app
        .store
        .update_folder(stockroom_core::types::FolderId::new(), UpdateFolder::rename("X"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_clone_keeps_clone_when_metadata_fails() {
    let h = Hierarchy::new();
    let items = items_in(Some(h.supplies.id), 2);
    let app = TestApp::new(h.folders(), items).await;
    app.remote
        .fail_nth(Operation::UpdateFolder, 1, AppError::validation("tag too long"));

    let metadata = UpdateFolder {
        tags: Some(["seasonal".to_string()].into()),
        ..UpdateFolder::default()
    };
    let outcome = app
        .store
        .clone_folder(
            h.supplies.id,
            CloneFolder {
                new_name: "Supplies 2027".to_string(),
                include_items: true,
            },
            Some(metadata),
        )
        .await
        .unwrap();

    assert_eq!(outcome.metadata_error.map(|e| e.kind), Some(ErrorKind::Validation));
    let clone = app.store.folder(outcome.folder.id).await.unwrap();
    assert_eq!(clone.name, "Supplies 2027");
    assert_eq!(clone.parent_id, Some(h.root.id));
    assert_eq!(clone.item_count, 2);
    assert!(clone.tags.is_empty());
}

#[tokio::test]
async fn test_clone_applies_metadata() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    let metadata = UpdateFolder {
        notes: Some("Restock monthly".to_string()),
        ..UpdateFolder::default()
    };
    let outcome = app
        .store
        .clone_folder(
            h.office.id,
            CloneFolder {
                new_name: "Office West".to_string(),
                include_items: false,
            },
            Some(metadata),
        )
        .await
        .unwrap();
    assert!(outcome.metadata_error.is_none());
    assert_eq!(outcome.folder.notes.as_deref(), Some("Restock monthly"));

    let err = app
        .store
        .clone_folder(
            h.office.id,
            CloneFolder {
                new_name: "office west".to_string(),
                include_items: false,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_fetch_keeps_last_known_when_offline() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;
    let before = app.store.folders().await;

    app.remote.set_offline(true);
    let outcome = app.store.fetch_folders().await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Degraded { .. }));
    assert_eq!(app.store.folders().await, before);
    assert!(app.store.last_error().await.unwrap().is_transport());

    app.remote.set_offline(false);
    assert!(app.store.fetch_folders().await.unwrap().is_fresh());
    assert!(app.store.last_error().await.is_none());
}

#[tokio::test]
async fn test_static_fallback_seeds_empty_store() {
    let h = Hierarchy::new();
    let fallback_items = items_in(Some(h.office.id), 3);
    let fallback = StaticFallback::new(h.folders(), fallback_items.clone());

    let app = TestApp::with_degraded(vec![], vec![], Arc::new(fallback)).await;
    assert!(app.store.folders().await.is_empty());

    app.remote.set_offline(true);
    let outcome = app.store.fetch_folders().await.unwrap();
    assert!(!outcome.is_fresh());
    assert_eq!(app.store.folders().await.len(), 5);

    let outcome = app.store.select_folder(h.office.id).await.unwrap();
    assert!(!outcome.is_fresh());
    assert_eq!(app.store.folder_items().await, fallback_items);
}

#[tokio::test]
async fn test_select_folder_loads_items() {
    let h = Hierarchy::new();
    let items = items_in(Some(h.b.id), 4);
    let app = TestApp::new(h.folders(), items).await;

    app.store.select_folder(h.b.id).await.unwrap();
    assert_eq!(app.store.selected_folder_id().await, Some(h.b.id));
    assert_eq!(app.store.folder_items().await.len(), 4);
    assert!(!app.store.is_loading().await);

    app.store.clear_selection().await;
    assert!(app.store.folder_items().await.is_empty());
    let err = app
        .store
        .refresh_items(&Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_hierarchy_falls_back_to_local_tree() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    let remote_tree = app.store.hierarchy().await.unwrap();
    assert_eq!(remote_tree.total_folders, 5);

    app.remote.set_offline(true);
    let local_tree = app.store.hierarchy().await.unwrap();
    assert_eq!(local_tree, app.store.tree().await);
    assert_eq!(local_tree.roots.len(), 2);
}

#[tokio::test]
async fn test_parent_options_and_path() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    let options: Vec<_> = app
        .store
        .parent_options(h.a.id)
        .await
        .into_iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(options, vec![h.root.id, h.supplies.id, h.office.id]);

    let path: Vec<String> = app
        .store
        .path_to(h.b.id)
        .await
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(path, vec!["Root", "A", "B"]);
}

#[tokio::test]
async fn test_pass_through_permissions_and_history() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;

    let grants = vec![FolderPermission {
        principal: "team:receiving".to_string(),
        access: "editor".to_string(),
    }];
    app.store
        .set_folder_permissions(h.office.id, &grants)
        .await
        .unwrap();
    assert_eq!(app.store.folder_permissions(h.office.id).await.unwrap(), grants);

    let history = app
        .store
        .folder_history(h.office.id, &Default::default())
        .await
        .unwrap();
    assert_eq!(history.items[0].action, "permissions_changed");

    app.remote.set_offline(true);
    let err = app.store.folder_alerts(h.office.id).await.unwrap_err();
    assert!(err.is_transport());
    assert!(app.store.last_error().await.is_some());
}

#[tokio::test]
async fn test_delete_refuses_to_merge_same_named_subfolders() {
    let h = Hierarchy::new();
    let mut folders = h.folders();
    folders.push(FolderRecord::new(FolderId::new(), "b", Some(h.office.id)));
    let app = TestApp::new(folders, vec![]).await;
    let before = app.store.snapshot().await;

    let err = app
        .store
        .delete_folder(h.a.id, Some(h.office.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.store.snapshot().await, before);
    assert_eq!(app.remote.call_count(Operation::DeleteFolder), 0);

    let err = app
        .remote
        .delete_folder(h.a.id, Some(h.office.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    let office_children: Vec<String> = app
        .remote
        .stored_folders()
        .await
        .into_iter()
        .filter(|f| f.parent_id == Some(h.office.id))
        .map(|f| f.name)
        .collect();
    assert_eq!(office_children, vec!["b"]);
}

#[tokio::test]
async fn test_failed_move_keeps_folder_created_meanwhile() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;
    app.remote
        .fail_nth(Operation::MoveFolder, 1, AppError::internal("database locked"));
    let mut held = app.remote.hold_next(Operation::MoveFolder);

    let (moved, created) = tokio::join!(
        app.store.move_folder(h.b.id, Some(h.office.id)),
        async {
            held.arrived().await;
            let created = app
                .store
                .create_folder(CreateFolder::named("Returns", None))
                .await;
            held.release();
            created
        }
    );

    assert_eq!(moved.unwrap_err().kind, ErrorKind::Internal);
    let created = created.unwrap();
    assert!(app.store.folder(created.id).await.is_some());
    assert_eq!(app.store.folder(h.b.id).await.unwrap().parent_id, Some(h.a.id));
    assert_eq!(app.store.folders().await.len(), 6);
}

#[tokio::test]
async fn test_failed_delete_keeps_selection_made_meanwhile() {
    let h = Hierarchy::new();
    let app = TestApp::new(h.folders(), vec![]).await;
    app.store.select_folder(h.office.id).await.unwrap();
    app.remote
        .fail_nth(Operation::DeleteFolder, 1, AppError::internal("database locked"));
    let mut held = app.remote.hold_next(Operation::DeleteFolder);

    let (deleted, _) = tokio::join!(app.store.delete_folder(h.office.id, None), async {
        held.arrived().await;
        assert!(app.store.folder(h.office.id).await.is_none());
        app.store.select_folder(h.supplies.id).await.unwrap();
        held.release();
    });

    assert_eq!(deleted.unwrap_err().kind, ErrorKind::Internal);
    assert!(app.store.folder(h.office.id).await.is_some());
    assert_eq!(app.store.selected_folder_id().await, Some(h.supplies.id));
}
