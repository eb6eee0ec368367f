//! Settings Storage as a JSON file
//!
//! A flat string-to-string map persisted as pretty-printed JSON. Writes go
//! through a temp file followed by a rename so a crash mid-write never
//! leaves a truncated settings file.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

/// JSON-file-backed settings store
pub struct JsonFileSettingsStore {
    path: PathBuf,
    // Guards the read-modify-write cycle; the map is loaded lazily
    cache: Mutex<Option<HashMap<String, String>>>,
}

impl JsonFileSettingsStore {
    /// Create a store backed by the given file. The file is created on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                BridgeError::OperationFailed(format!("Corrupted settings file: {}", e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn flush(&self, map: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(BridgeError::Io)?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await.map_err(BridgeError::Io)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(BridgeError::Io)?;

        Ok(())
    }

    async fn ensure_loaded<'a>(
        &self,
        cache: &'a mut Option<HashMap<String, String>>,
    ) -> Result<&'a mut HashMap<String, String>> {
        if cache.is_none() {
            *cache = Some(self.load().await?);
        }
        Ok(cache.as_mut().unwrap())
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut cache = self.cache.lock().await;
        let map = self.ensure_loaded(&mut *cache).await?;
        map.insert(key.to_string(), value.to_string());
        self.flush(map).await?;

        debug!(key, "Setting stored");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let mut cache = self.cache.lock().await;
        let map = self.ensure_loaded(&mut *cache).await?;
        Ok(map.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut cache = self.cache.lock().await;
        let map = self.ensure_loaded(&mut *cache).await?;
        if map.remove(key).is_some() {
            self.flush(map).await?;
            debug!(key, "Setting deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSettingsStore::new(dir.path().join("settings.json"));

        assert!(store.get_string("missing").await.unwrap().is_none());

        store.set_string("player.queue.v1", "[]").await.unwrap();
        assert_eq!(
            store.get_string("player.queue.v1").await.unwrap().as_deref(),
            Some("[]")
        );

        store.delete("player.queue.v1").await.unwrap();
        assert!(store.get_string("player.queue.v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        {
            let store = JsonFileSettingsStore::new(&path);
            store.set_string("key", "value").await.unwrap();
        }

        let reopened = JsonFileSettingsStore::new(&path);
        assert_eq!(
            reopened.get_string("key").await.unwrap().as_deref(),
            Some("value")
        );
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSettingsStore::new(dir.path().join("settings.json"));
        store.delete("never-set").await.unwrap();
    }
}
