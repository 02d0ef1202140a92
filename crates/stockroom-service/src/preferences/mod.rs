//! Preference store implementations and provider selection.

pub mod file;
pub mod memory;

use std::sync::Arc;

use tracing::info;

use stockroom_core::config::preferences::{PreferencesConfig, PreferencesProvider};
use stockroom_core::result::AppResult;
use stockroom_core::traits::PreferenceStore;

pub use file::FilePreferenceStore;
pub use memory::MemoryPreferenceStore;

/// Build the preference store selected by configuration.
pub async fn from_config(config: &PreferencesConfig) -> AppResult<Arc<dyn PreferenceStore>> {
    let store: Arc<dyn PreferenceStore> = match config.provider {
        PreferencesProvider::File => {
            info!(directory = %config.directory, "Initializing file preference store");
            Arc::new(FilePreferenceStore::new(&config.directory).await?)
        }
        PreferencesProvider::Memory => {
            info!("Initializing in-memory preference store");
            Arc::new(MemoryPreferenceStore::new())
        }
    };
    Ok(store)
}
