//! Batched bulk item relocation with partial-success accounting.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use stockroom_core::config::relocate::RelocateConfig;
use stockroom_core::types::{FolderId, ItemId};
use stockroom_entity::item::ItemPatch;

use super::recent::RecentFolders;
use crate::remote::FolderRemote;

/// Progress after a batch has resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocateProgress {
    /// Items whose batch has resolved, successfully or not.
    pub processed: usize,
    /// Items in the whole request.
    pub total: usize,
    /// `processed / total` as a percentage rounded to the nearest integer.
    pub percent: u8,
    /// Zero-based index of the batch that just resolved.
    pub batch_index: usize,
    /// Number of batches in the request.
    pub batch_count: usize,
}

impl RelocateProgress {
    fn new(processed: usize, total: usize, batch_index: usize, batch_count: usize) -> Self {
        Self {
            processed,
            total,
            percent: percent(processed, total),
            batch_index,
            batch_count,
        }
    }
}

/// Terminal outcome of a relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocateStatus {
    /// No item failed. An empty request also ends here.
    AllSucceeded,
    /// Some, but not all, items failed.
    PartialSuccess,
    /// Every item failed.
    AllFailed,
}

impl fmt::Display for RelocateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllSucceeded => write!(f, "all succeeded"),
            Self::PartialSuccess => write!(f, "partial success"),
            Self::AllFailed => write!(f, "all failed"),
        }
    }
}

/// A failed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchError {
    /// Zero-based batch index.
    pub batch_index: usize,
    /// Number of items in the batch.
    pub item_count: usize,
    /// User-facing failure message.
    pub message: String,
}

/// Summary of a finished relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocateReport {
    /// Destination folder (`None` for the root).
    pub destination: Option<FolderId>,
    /// Items requested.
    pub total: usize,
    /// Items moved.
    pub completed: usize,
    /// Items in failed batches.
    pub failed_items: Vec<ItemId>,
    /// One entry per failed batch, in batch order.
    pub errors: Vec<BatchError>,
    /// Number of batches sent.
    pub batch_count: usize,
    /// Terminal outcome.
    pub status: RelocateStatus,
}

impl RelocateReport {
    /// Number of items that were not moved.
    pub fn failed(&self) -> usize {
        self.failed_items.len()
    }
}

/// Moves many items into one folder in sequential, fixed-size batches.
///
/// A failed batch is recorded and the remaining batches still run. Batch
/// `k + 1` is sent only after batch `k` has resolved, so progress is
/// monotonic.
#[derive(Debug, Clone)]
pub struct BulkRelocator {
    remote: Arc<dyn FolderRemote>,
    recent: RecentFolders,
    batch_size: usize,
}

impl BulkRelocator {
    /// Create a relocator.
    pub fn new(remote: Arc<dyn FolderRemote>, recent: RecentFolders, config: &RelocateConfig) -> Self {
        Self {
            remote,
            recent,
            batch_size: config.batch_size.max(1),
        }
    }

    /// Items per bulk-update request.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The recently used destinations this relocator maintains.
    pub fn recent(&self) -> &RecentFolders {
        &self.recent
    }

    /// Relocate without progress reporting.
    pub async fn relocate(&self, item_ids: &[ItemId], destination: Option<FolderId>) -> RelocateReport {
        self.relocate_with_progress(item_ids, destination, |_| {}).await
    }

    /// Relocate `item_ids` into `destination`, calling `on_progress` after
    /// every batch.
    pub async fn relocate_with_progress<F>(
        &self,
        item_ids: &[ItemId],
        destination: Option<FolderId>,
        mut on_progress: F,
    ) -> RelocateReport
    where
        F: FnMut(RelocateProgress) + Send,
    {
        let total = item_ids.len();
        let batch_count = total.div_ceil(self.batch_size);
        let patch = ItemPatch {
            folder_id: destination,
        };

        info!(
            total,
            batch_count,
            destination = ?destination,
            "Starting bulk relocation"
        );

        let mut processed = 0usize;
        let mut failed_items = Vec::new();
        let mut errors = Vec::new();

        for (batch_index, batch) in item_ids.chunks(self.batch_size).enumerate() {
            match self.remote.bulk_update_items(batch, &patch).await {
                Ok(()) => {
                    debug!(batch_index, items = batch.len(), "Batch relocated");
                }
                Err(e) => {
                    warn!(batch_index, items = batch.len(), error = %e, "Batch relocation failed");
                    failed_items.extend_from_slice(batch);
                    errors.push(BatchError {
                        batch_index,
                        item_count: batch.len(),
                        message: e.message,
                    });
                }
            }
            processed += batch.len();
            on_progress(RelocateProgress::new(processed, total, batch_index, batch_count));
        }

        let failed = failed_items.len();
        let completed = total - failed;
        let status = if failed == 0 {
            RelocateStatus::AllSucceeded
        } else if completed == 0 {
            RelocateStatus::AllFailed
        } else {
            RelocateStatus::PartialSuccess
        };

        if let Some(folder_id) = destination {
            if completed > 0 {
                self.recent.record(folder_id).await;
            }
        }

        match status {
            RelocateStatus::AllSucceeded => info!(total, "Bulk relocation finished"),
            _ => warn!(total, completed, failed, status = %status, "Bulk relocation finished with failures"),
        }

        RelocateReport {
            destination,
            total,
            completed,
            failed_items,
            errors,
            batch_count,
            status,
        }
    }
}

/// `processed / total` as a rounded percentage; an empty request is complete.
fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let rounded = (processed * 200 + total) / (total * 2);
    rounded.min(100) as u8
}
