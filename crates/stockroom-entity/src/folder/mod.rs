//! Folder domain entities.

pub mod extras;
pub mod model;
pub mod request;
pub mod tree;

pub use extras::{FolderAlert, FolderHistoryEntry, FolderLabel, FolderPermission};
pub use model::FolderRecord;
pub use request::{CloneFolder, CreateFolder, FolderFilter, UpdateFolder};
pub use tree::{FolderNode, FolderTree};
