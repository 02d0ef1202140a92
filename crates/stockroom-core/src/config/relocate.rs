//! Bulk relocation configuration.

use serde::{Deserialize, Serialize};

/// Bulk item relocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocateConfig {
    /// Number of item ids sent per bulk-update request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Length of the recently used destination list.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for RelocateConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_batch_size() -> usize {
    20
}

fn default_recent_limit() -> usize {
    5
}
