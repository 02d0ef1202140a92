//! Preference store trait for small pieces of client-side state.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;

/// Key-value store for client state that must survive across sessions,
/// such as the recently used destination folders.
///
/// Values are opaque strings (JSON in practice). Implementations must
/// treat a missing key as `Ok(None)`, never as an error.
#[async_trait]
pub trait PreferenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get the value stored under `key`.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

impl dyn PreferenceStore {
    /// Get a typed value by deserializing from JSON.
    ///
    /// Unparseable data is a `Serialization` error.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.set(key, &json).await
    }
}
