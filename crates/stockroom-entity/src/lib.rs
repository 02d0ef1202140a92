//! # stockroom-entity
//!
//! Domain entity models for the folder hierarchy: folder records, tree
//! nodes, request payloads, items, and the opaque records the surrounding
//! dashboard passes through (history, permissions, alerts, labels).

pub mod folder;
pub mod item;
