//! Most-recently-used destination folders.

use std::sync::Arc;

use tracing::{debug, warn};

use stockroom_core::traits::PreferenceStore;
use stockroom_core::types::FolderId;

/// Preference key holding the recent destination list.
pub const RECENT_FOLDERS_KEY: &str = "stockroom.recent_destination_folders";

/// Bounded, most-recent-first list of destination folders, persisted
/// through a [`PreferenceStore`].
///
/// This is convenience state. Unreadable data loads as an empty list and
/// failed writes are logged, never returned.
#[derive(Debug, Clone)]
pub struct RecentFolders {
    store: Arc<dyn PreferenceStore>,
    limit: usize,
}

impl RecentFolders {
    /// Create a list holding at most `limit` entries (at least one).
    pub fn new(store: Arc<dyn PreferenceStore>, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
        }
    }

    /// Maximum number of entries kept.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Current entries, most recent first.
    pub async fn list(&self) -> Vec<FolderId> {
        match self.store.get_json::<Vec<FolderId>>(RECENT_FOLDERS_KEY).await {
            Ok(Some(mut ids)) => {
                dedup_in_order(&mut ids);
                ids.truncate(self.limit);
                ids
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable recent folders");
                Vec::new()
            }
        }
    }

    /// Put `folder_id` at the front and return the updated list.
    pub async fn record(&self, folder_id: FolderId) -> Vec<FolderId> {
        let ids = push_front(self.list().await, folder_id, self.limit);
        self.persist(&ids).await;
        ids
    }

    /// Drop `folder_id`, e.g. after the folder was deleted.
    pub async fn forget(&self, folder_id: FolderId) -> Vec<FolderId> {
        let mut ids = self.list().await;
        let before = ids.len();
        ids.retain(|id| *id != folder_id);
        if ids.len() != before {
            self.persist(&ids).await;
        }
        ids
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        if let Err(e) = self.store.delete(RECENT_FOLDERS_KEY).await {
            warn!(error = %e, "Failed to clear recent folders");
        }
    }

    async fn persist(&self, ids: &[FolderId]) {
        match self.store.set_json(RECENT_FOLDERS_KEY, ids).await {
            Ok(()) => debug!(count = ids.len(), "Recent folders saved"),
            Err(e) => warn!(error = %e, "Failed to save recent folders"),
        }
    }
}

/// Move or insert `folder_id` at the front, keeping at most `limit` ids.
fn push_front(mut ids: Vec<FolderId>, folder_id: FolderId, limit: usize) -> Vec<FolderId> {
    ids.retain(|id| *id != folder_id);
    ids.insert(0, folder_id);
    ids.truncate(limit);
    ids
}

fn dedup_in_order(ids: &mut Vec<FolderId>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferenceStore;

    fn recent() -> (RecentFolders, Arc<MemoryPreferenceStore>) {
        let prefs = Arc::new(MemoryPreferenceStore::new());
        (RecentFolders::new(prefs.clone(), 5), prefs)
    }

    #[tokio::test]
    async fn test_six_inserts_keep_last_five_newest_first() {
        let (recent, _) = recent();
        let ids: Vec<FolderId> = (0..6).map(|_| FolderId::new()).collect();
        for id in &ids {
            recent.record(*id).await;
        }

        let expected: Vec<FolderId> = ids.iter().rev().take(5).copied().collect();
        assert_eq!(recent.list().await, expected);
    }

    #[tokio::test]
    async fn test_reinsert_moves_to_front_without_duplicates() {
        let (recent, _) = recent();
        let a = FolderId::new();
        let b = FolderId::new();
        recent.record(a).await;
        recent.record(b).await;
        let list = recent.record(a).await;
        assert_eq!(list, vec![a, b]);
    }

    #[tokio::test]
    async fn test_corrupt_data_reads_as_empty() {
        let (recent, prefs) = recent();
        prefs.set(RECENT_FOLDERS_KEY, "{not json").await.unwrap();
        assert!(recent.list().await.is_empty());

        let id = FolderId::new();
        assert_eq!(recent.record(id).await, vec![id]);
    }

    #[tokio::test]
    async fn test_forget_and_clear() {
        let (recent, prefs) = recent();
        let a = FolderId::new();
        let b = FolderId::new();
        recent.record(a).await;
        recent.record(b).await;
        assert_eq!(recent.forget(a).await, vec![b]);

        recent.clear().await;
        assert!(recent.list().await.is_empty());
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_push_front_respects_limit() {
        let ids: Vec<FolderId> = (0..3).map(|_| FolderId::new()).collect();
        let new = FolderId::new();
        let out = push_front(ids.clone(), new, 3);
        assert_eq!(out, vec![new, ids[0], ids[1]]);
    }
}
