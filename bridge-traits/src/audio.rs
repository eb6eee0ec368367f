//! Audio Engine Abstraction
//!
//! The core drives the host's audio subsystem through opaque handles. At most
//! one handle is live at a time; the core releases the previous handle before
//! loading the next source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;

/// Opaque identifier for a loaded audio instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioHandleId(Uuid);

impl AudioHandleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AudioHandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AudioHandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source material for an audio instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Stream from a remote URL
    Remote {
        url: String,
        headers: HashMap<String, String>,
    },
}

impl AudioSource {
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            headers: HashMap::new(),
        }
    }
}

/// Point-in-time status of an audio instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStatus {
    /// Current playhead position
    pub position: Duration,
    /// Total duration, if known
    pub duration: Option<Duration>,
    /// Whether audio is currently playing
    pub is_playing: bool,
    /// Set exactly once when the instance reaches the end of its source
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    pub fn stopped() -> Self {
        Self {
            position: Duration::ZERO,
            duration: None,
            is_playing: false,
            did_just_finish: false,
        }
    }
}

/// Host audio subsystem
///
/// Implementations own decoding and output. Handles returned by [`load`]
/// remain valid until [`unload`] is called; operations on released handles
/// fail with a bridge error.
///
/// [`load`]: AudioEngine::load
/// [`unload`]: AudioEngine::unload
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Load a source and return a handle to the new instance
    ///
    /// When `autoplay` is true the instance starts playing as soon as enough
    /// data is buffered.
    async fn load(&self, source: AudioSource, autoplay: bool) -> Result<AudioHandleId>;

    /// Begin or resume playback
    async fn play(&self, handle: AudioHandleId) -> Result<()>;

    /// Pause playback, keeping the playhead position
    async fn pause(&self, handle: AudioHandleId) -> Result<()>;

    /// Stop playback and reset the playhead to zero
    async fn stop(&self, handle: AudioHandleId) -> Result<()>;

    /// Move the playhead
    async fn seek(&self, handle: AudioHandleId, position: Duration) -> Result<()>;

    /// Release the instance and its resources
    ///
    /// The handle is invalid afterwards. Status streams for the handle end.
    async fn unload(&self, handle: AudioHandleId) -> Result<()>;

    /// Subscribe to status updates for an instance
    ///
    /// The engine publishes a [`PlaybackStatus`] on every meaningful change,
    /// including one with `did_just_finish` set when the source plays to
    /// completion.
    async fn status_stream(
        &self,
        handle: AudioHandleId,
    ) -> Result<tokio::sync::broadcast::Receiver<PlaybackStatus>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_id_uniqueness() {
        let a = AudioHandleId::new();
        let b = AudioHandleId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remote_source_has_no_default_headers() {
        let source = AudioSource::remote("https://example.com/preview.m4a");
        let AudioSource::Remote { url, headers } = source;
        assert_eq!(url, "https://example.com/preview.m4a");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_stopped_status() {
        let status = PlaybackStatus::stopped();
        assert_eq!(status.position, Duration::ZERO);
        assert!(!status.is_playing);
        assert!(!status.did_just_finish);
    }
}
