//! Client-side preference persistence configuration.

use serde::{Deserialize, Serialize};

/// Backing store for preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferencesProvider {
    /// One JSON file per key under [`PreferencesConfig::directory`].
    #[default]
    File,
    /// Process memory only; nothing survives a restart.
    Memory,
}

/// Preference persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Provider type: `"file"` or `"memory"`.
    #[serde(default)]
    pub provider: PreferencesProvider,
    /// Directory holding preference files.
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            provider: PreferencesProvider::default(),
            directory: default_directory(),
        }
    }
}

fn default_directory() -> String {
    "data/preferences".to_string()
}
