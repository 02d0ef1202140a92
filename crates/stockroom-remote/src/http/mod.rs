//! JSON-over-HTTP binding of the folder service.

mod client;
pub mod wire;

pub use client::HttpFolderRemote;
