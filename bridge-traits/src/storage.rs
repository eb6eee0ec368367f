//! Storage Abstraction Traits
//!
//! Two persistence surfaces with different guarantees:
//!
//! - [`SecureStore`] for credentials, backed by the platform keychain
//! - [`SettingsStore`] for non-secret snapshots, backed by whatever durable
//!   key-value storage the host has

use async_trait::async_trait;

use crate::error::Result;

/// Secure credential storage
///
/// Values are opaque strings; callers own serialization. Implementations must
/// never log stored values.
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value under the given key, replacing any existing value
    async fn set_secret(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a secret value
    ///
    /// Returns `Ok(None)` if the key does not exist.
    async fn get_secret(&self, key: &str) -> Result<Option<String>>;

    /// Delete a secret
    ///
    /// Deleting a key that does not exist is not an error.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check whether a secret exists without reading it
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}

/// Durable key-value storage for non-secret application state
///
/// Used for snapshots that should survive restarts but carry no security
/// requirements, such as the persisted playback queue.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value under the given key, replacing any existing value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    ///
    /// Returns `Ok(None)` if the key does not exist.
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a key
    ///
    /// Deleting a key that does not exist is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether a key exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }
}
