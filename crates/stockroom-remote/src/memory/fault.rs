//! Scripted failures for the in-memory service.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tokio::sync::oneshot;

use stockroom_core::error::AppError;
use stockroom_core::result::AppResult;

/// A remote operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListFolders,
    FolderHierarchy,
    FolderItems,
    CreateFolder,
    UpdateFolder,
    DeleteFolder,
    CloneFolder,
    MoveFolder,
    BulkUpdateItems,
    FolderHistory,
    FolderPermissions,
    SetFolderPermissions,
    FolderAlerts,
    SetFolderAlerts,
    FolderLabels,
    SetFolderLabels,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ListFolders => "list_folders",
            Self::FolderHierarchy => "folder_hierarchy",
            Self::FolderItems => "folder_items",
            Self::CreateFolder => "create_folder",
            Self::UpdateFolder => "update_folder",
            Self::DeleteFolder => "delete_folder",
            Self::CloneFolder => "clone_folder",
            Self::MoveFolder => "move_folder",
            Self::BulkUpdateItems => "bulk_update_items",
            Self::FolderHistory => "folder_history",
            Self::FolderPermissions => "folder_permissions",
            Self::SetFolderPermissions => "set_folder_permissions",
            Self::FolderAlerts => "folder_alerts",
            Self::SetFolderAlerts => "set_folder_alerts",
            Self::FolderLabels => "folder_labels",
            Self::SetFolderLabels => "set_folder_labels",
        };
        f.write_str(s)
    }
}

/// Per-operation call counters and pending failures.
#[derive(Debug, Default)]
pub(crate) struct FaultInjector {
    offline: AtomicBool,
    calls: DashMap<Operation, u64>,
    /// Absolute call number at which each pending error fires.
    pending: DashMap<Operation, Vec<(u64, AppError)>>,
    /// Next call of an operation parks here until released.
    held: DashMap<Operation, Gate>,
}

/// Service side of a [`HeldCall`].
#[derive(Debug)]
pub(crate) struct Gate {
    arrived: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

impl Gate {
    /// Signal arrival and wait for release. A dropped handle releases.
    pub(crate) async fn pass(self) {
        let _ = self.arrived.send(());
        let _ = self.release.await;
    }
}

/// Handle on a call parked by `InMemoryFolderRemote::hold_next`.
#[derive(Debug)]
pub struct HeldCall {
    arrived: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl HeldCall {
    /// Wait until the held call has reached the service.
    pub async fn arrived(&mut self) {
        let _ = (&mut self.arrived).await;
    }

    /// Let the held call proceed.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl FaultInjector {
    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_nth(&self, operation: Operation, n: u64, error: AppError) {
        let at = self.call_count(operation) + n.max(1);
        self.pending.entry(operation).or_default().push((at, error));
    }

    pub(crate) fn hold_next(&self, operation: Operation) -> HeldCall {
        let (arrived_tx, arrived_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.held.insert(
            operation,
            Gate {
                arrived: arrived_tx,
                release: release_rx,
            },
        );
        HeldCall {
            arrived: arrived_rx,
            release: release_tx,
        }
    }

    pub(crate) fn take_gate(&self, operation: Operation) -> Option<Gate> {
        self.held.remove(&operation).map(|(_, gate)| gate)
    }

    pub(crate) fn clear(&self) {
        self.pending.clear();
        self.held.clear();
        self.set_offline(false);
    }

    pub(crate) fn call_count(&self, operation: Operation) -> u64 {
        self.calls.get(&operation).map(|c| *c).unwrap_or(0)
    }

    /// Count a call and return the failure scheduled for it, if any.
    pub(crate) fn check(&self, operation: Operation) -> AppResult<()> {
        let call = {
            let mut count = self.calls.entry(operation).or_insert(0);
            *count += 1;
            *count
        };

        if self.is_offline() {
            return Err(AppError::transport(format!(
                "Inventory service unreachable during {operation}"
            )));
        }

        if let Some(mut pending) = self.pending.get_mut(&operation) {
            if let Some(pos) = pending.iter().position(|(at, _)| *at == call) {
                let (_, error) = pending.remove(pos);
                return Err(error);
            }
        }
        Ok(())
    }
}
