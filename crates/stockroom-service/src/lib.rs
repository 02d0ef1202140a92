//! # stockroom-service
//!
//! Folder hierarchy services. The [`folder::FolderStore`] owns the
//! authoritative in-memory collection and applies every mutation through
//! the [`folder::CycleGuard`] and [`folder::TreeIndex`]; the
//! [`relocate::BulkRelocator`] moves items between folders in batches.
//! Both talk to the outside world only through [`remote::FolderRemote`].

pub mod folder;
pub mod preferences;
pub mod relocate;
pub mod remote;

pub use remote::FolderRemote;
