//! Remote folder service configuration.

use serde::{Deserialize, Serialize};

/// Which remote collaborator implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteProvider {
    /// JSON over HTTP against the inventory API.
    Http,
    /// In-process service, optionally seeded from a JSON file.
    #[default]
    Memory,
}

/// Remote folder service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Provider type: `"http"` or `"memory"`.
    #[serde(default)]
    pub provider: RemoteProvider,
    /// Base URL of the inventory API, e.g. `https://api.example.com/v1`.
    #[serde(default)]
    pub base_url: String,
    /// Optional bearer token sent with every request.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// JSON seed file for the memory provider.
    #[serde(default)]
    pub seed_path: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            provider: RemoteProvider::default(),
            base_url: String::new(),
            api_token: None,
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            seed_path: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}
