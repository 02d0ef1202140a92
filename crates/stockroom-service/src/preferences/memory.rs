//! In-process preference store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use stockroom_core::result::AppResult;
use stockroom_core::traits::PreferenceStore;

/// Preference store backed by a concurrent map. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryPreferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
