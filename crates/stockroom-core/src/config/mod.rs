//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Every field carries a serde default, so an empty or
//! missing file still yields a usable configuration.

pub mod logging;
pub mod preferences;
pub mod relocate;
pub mod remote;
pub mod store;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::preferences::PreferencesConfig;
use self::relocate::RelocateConfig;
use self::remote::RemoteConfig;
use self::store::StoreConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML files
/// (`default.toml` + environment overlay) and `STOCKROOM__*` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote folder service settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Folder store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Bulk relocation settings.
    #[serde(default)]
    pub relocate: RelocateConfig,
    /// Client-side preference persistence.
    #[serde(default)]
    pub preferences: PreferencesConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `{dir}/default.toml`, `{dir}/{env}.toml`
    /// and environment variables prefixed with `STOCKROOM__`.
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("STOCKROOM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the store or relocator misbehave.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.relocate.batch_size == 0 {
            return Err(AppError::configuration("relocate.batch_size must be at least 1"));
        }
        if self.relocate.recent_limit == 0 {
            return Err(AppError::configuration("relocate.recent_limit must be at least 1"));
        }
        if self.store.max_tree_depth == 0 {
            return Err(AppError::configuration("store.max_tree_depth must be at least 1"));
        }
        if self.remote.provider == remote::RemoteProvider::Http && self.remote.base_url.is_empty() {
            return Err(AppError::configuration(
                "remote.base_url is required for the http provider",
            ));
        }
        Ok(())
    }
}
