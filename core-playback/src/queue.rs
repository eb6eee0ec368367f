//! Queue Persistence
//!
//! Snapshots the playback queue into the host's [`SettingsStore`] under a
//! versioned key. The queue is a convenience, not a source of truth: every
//! failure here is logged and absorbed so playback never stalls on storage.

use crate::error::{PlaybackError, Result};
use bridge_traits::storage::SettingsStore;
use core_catalog::Track;
use std::sync::Arc;
use tracing::{debug, warn};

const KEY_QUEUE: &str = "player.queue.v1";

/// Persists queue snapshots as JSON.
#[derive(Clone)]
pub struct QueueStore {
    settings: Arc<dyn SettingsStore>,
}

impl QueueStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Save a queue snapshot, replacing any previous one.
    pub async fn save(&self, tracks: &[Track]) -> Result<()> {
        let json = serde_json::to_string(tracks)
            .map_err(|e| PlaybackError::Persistence(format!("Failed to serialize queue: {}", e)))?;

        self.settings
            .set_string(KEY_QUEUE, &json)
            .await
            .map_err(|e| PlaybackError::Persistence(e.to_string()))?;

        debug!(track_count = tracks.len(), "Queue snapshot saved");
        Ok(())
    }

    /// Load the persisted queue.
    ///
    /// Absence is first-run. A read failure or corrupted snapshot is logged
    /// and treated as absent.
    pub async fn load(&self) -> Option<Vec<Track>> {
        let json = match self.settings.get_string(KEY_QUEUE).await {
            Ok(Some(json)) => json,
            Ok(None) => {
                debug!("No persisted queue");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted queue");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Track>>(&json) {
            Ok(tracks) => {
                debug!(track_count = tracks.len(), "Queue snapshot loaded");
                Some(tracks)
            }
            Err(e) => {
                warn!(error = %e, "Corrupted queue snapshot, ignoring");
                None
            }
        }
    }
}
