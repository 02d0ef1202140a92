//! # stockroom-remote
//!
//! Implementations of [`FolderRemote`](stockroom_service::FolderRemote):
//!
//! - **http**: JSON over HTTP against the inventory API, using reqwest
//! - **memory**: an in-process service enforcing the same rules, with
//!   fault injection for tests and offline use
//!
//! The implementation is selected at runtime from configuration.

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

#[cfg(feature = "http")]
pub use http::HttpFolderRemote;
#[cfg(feature = "memory")]
pub use memory::{HeldCall, InMemoryFolderRemote, Operation};
pub use provider::from_config;
