//! Remote selection from configuration.

use std::sync::Arc;

use tracing::info;

use stockroom_core::config::remote::{RemoteConfig, RemoteProvider};
#[allow(unused_imports)]
use stockroom_core::error::AppError;
use stockroom_core::result::AppResult;
use stockroom_service::FolderRemote;

/// Build the remote folder service selected by `config.provider`.
pub async fn from_config(config: &RemoteConfig) -> AppResult<Arc<dyn FolderRemote>> {
    let remote: Arc<dyn FolderRemote> = match config.provider {
        #[cfg(feature = "http")]
        RemoteProvider::Http => {
            info!(base_url = %config.base_url, "Initializing HTTP folder remote");
            Arc::new(crate::http::HttpFolderRemote::new(config)?)
        }
        #[cfg(feature = "memory")]
        RemoteProvider::Memory => {
            let remote = match &config.seed_path {
                Some(path) => crate::memory::InMemoryFolderRemote::from_seed_file(path).await?,
                None => crate::memory::InMemoryFolderRemote::new(),
            };
            info!(seed = ?config.seed_path, "Initializing in-memory folder remote");
            Arc::new(remote)
        }
        #[allow(unreachable_patterns)]
        other => {
            return Err(AppError::configuration(format!(
                "Remote provider '{other:?}' is not compiled in"
            )));
        }
    };
    Ok(remote)
}
