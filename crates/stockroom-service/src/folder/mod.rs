//! Folder hierarchy: indexing, guards, and the optimistic store.

pub mod degraded;
pub mod guard;
pub mod snapshot;
pub mod store;
pub mod tree;

pub use degraded::{DegradedModeProvider, KeepLastKnown, StaticFallback};
pub use guard::CycleGuard;
pub use snapshot::Snapshot;
pub use store::{CloneOutcome, DeleteOutcome, FetchOutcome, FolderStore, MutationPhase};
pub use tree::{PathError, TreeIndex};
