//! Inventory item entities.
//!
//! Items are owned by a separate collaborator; the hierarchy core only
//! reads them for the selected folder and rewrites their `folder_id`.

pub mod model;

pub use model::{ItemPatch, ItemQuery, ItemRecord};
