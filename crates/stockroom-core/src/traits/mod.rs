//! Core traits defined in `stockroom-core` and implemented by other crates.

pub mod preferences;

pub use preferences::PreferenceStore;
