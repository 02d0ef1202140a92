//! Batched relocation of items between folders.

pub mod bulk;
pub mod recent;

pub use bulk::{BatchError, BulkRelocator, RelocateProgress, RelocateReport, RelocateStatus};
pub use recent::{RECENT_FOLDERS_KEY, RecentFolders};
