//! Folder store configuration.

use serde::{Deserialize, Serialize};

/// How the store behaves when the remote service is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedMode {
    /// Keep whatever was last loaded successfully.
    #[default]
    KeepLast,
    /// Seed an empty store from a static JSON snapshot.
    Static,
}

/// Folder store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Depth bound for tree building and ancestor walks.
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,
    /// Degraded-mode policy.
    #[serde(default)]
    pub degraded_mode: DegradedMode,
    /// Snapshot file used by [`DegradedMode::Static`].
    #[serde(default)]
    pub fallback_path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: default_max_tree_depth(),
            degraded_mode: DegradedMode::default(),
            fallback_path: None,
        }
    }
}

fn default_max_tree_depth() -> usize {
    64
}
