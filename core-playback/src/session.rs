//! Playback Session
//!
//! Drives the audio engine through the queue: `Empty → Loading → Playing ⇄
//! Paused → Empty`. At most one engine handle is live at a time; the session
//! releases the previous handle before loading the next source.
//!
//! ## Concurrency
//!
//! All transport transitions are serialized through one internal async lock,
//! so overlapping calls queue instead of racing. Each load carries a
//! generation number; a completion reported by a superseded load is
//! discarded. The per-handle status watcher is aborted when its handle is
//! released, so a stale watcher can never mutate session state.

use crate::error::{PlaybackError, Result};
use crate::queue::QueueStore;
use bridge_traits::audio::{AudioEngine, AudioHandleId, AudioSource, PlaybackStatus};
use bridge_traits::storage::SettingsStore;
use core_catalog::{CatalogClient, Track};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle phase of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// Nothing loaded
    #[default]
    Empty,
    /// A source is being loaded
    Loading,
    /// Audio is playing
    Playing,
    /// Audio is paused with a live handle
    Paused,
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Empty => write!(f, "Empty"),
            PlayerState::Loading => write!(f, "Loading"),
            PlayerState::Playing => write!(f, "Playing"),
            PlayerState::Paused => write!(f, "Paused"),
        }
    }
}

/// Point-in-time view of the session for the host's now-playing surface.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: PlayerState,
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub queue_len: usize,
    pub status: PlaybackStatus,
}

#[derive(Default)]
struct SessionState {
    queue: Vec<Track>,
    current_index: Option<usize>,
    current_track: Option<Track>,
    last_played: Option<Track>,
    handle: Option<AudioHandleId>,
    watcher: Option<JoinHandle<()>>,
    phase: PlayerState,
}

struct SessionInner {
    engine: Arc<dyn AudioEngine>,
    catalog: Arc<CatalogClient>,
    queue_store: QueueStore,
    events: EventBus,
    state: AsyncMutex<SessionState>,
    transport: AsyncMutex<()>,
    generation: AtomicU64,
    latest_status: StdMutex<PlaybackStatus>,
}

enum ToggleAction {
    Pause(AudioHandleId, u64),
    Resume(AudioHandleId, u64),
    Start(Track, usize),
    Nothing,
}

/// Playback queue and transport controller.
///
/// Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct PlayerSession {
    inner: Arc<SessionInner>,
}

impl PlayerSession {
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        catalog: Arc<CatalogClient>,
        settings: Arc<dyn SettingsStore>,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                engine,
                catalog,
                queue_store: QueueStore::new(settings),
                events,
                state: AsyncMutex::new(SessionState::default()),
                transport: AsyncMutex::new(()),
                generation: AtomicU64::new(0),
                latest_status: StdMutex::new(PlaybackStatus::stopped()),
            }),
        }
    }

    /// Load the persisted queue at startup.
    ///
    /// Returns `true` when a queue snapshot was restored. Absence or a
    /// corrupt snapshot is first-run. Playback is not started.
    pub async fn restore(&self) -> bool {
        match self.inner.queue_store.load().await {
            Some(tracks) => {
                let track_count = tracks.len();
                self.inner.state.lock().await.queue = tracks;
                info!(track_count, "Restored persisted queue");
                true
            }
            None => false,
        }
    }

    /// Insert the track at the head of the queue and start playing it.
    pub async fn play_now(&self, track: Track) -> Result<()> {
        let _transport = self.inner.transport.lock().await;

        let snapshot = {
            let mut state = self.inner.state.lock().await;
            state.queue.insert(0, track.clone());
            // The previously-current entry shifted one slot right
            if let Some(index) = state.current_index.as_mut() {
                *index += 1;
            }
            state.queue.clone()
        };
        self.persist_queue(snapshot);

        self.load_and_play_locked(track, 0).await
    }

    /// Append the track to the end of the queue without touching playback.
    ///
    /// The queue snapshot is persisted in the background; a persistence
    /// failure is logged and swallowed.
    pub async fn add_to_queue(&self, track: Track) {
        let snapshot = {
            let mut state = self.inner.state.lock().await;
            state.queue.push(track);
            state.queue.clone()
        };
        debug!(queue_len = snapshot.len(), "Track enqueued");
        self.persist_queue(snapshot);
    }

    /// Pause or resume playback.
    ///
    /// With no live handle this starts the resume index instead: the current
    /// index if one is set, otherwise the queue head. An empty queue is a
    /// no-op.
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let _transport = self.inner.transport.lock().await;

        let action = {
            let state = self.inner.state.lock().await;
            match (state.handle, state.current_track.as_ref()) {
                (Some(handle), Some(track)) => {
                    let playing = self.inner.latest_status.lock().unwrap().is_playing;
                    if playing {
                        ToggleAction::Pause(handle, track.id)
                    } else {
                        ToggleAction::Resume(handle, track.id)
                    }
                }
                _ => {
                    let index = state.current_index.unwrap_or(0);
                    match state.queue.get(index) {
                        Some(track) => ToggleAction::Start(track.clone(), index),
                        None => ToggleAction::Nothing,
                    }
                }
            }
        };

        match action {
            ToggleAction::Pause(handle, track_id) => {
                self.inner
                    .engine
                    .pause(handle)
                    .await
                    .map_err(|e| PlaybackError::Engine(e.to_string()))?;
                self.inner.latest_status.lock().unwrap().is_playing = false;
                self.inner.state.lock().await.phase = PlayerState::Paused;
                self.inner
                    .events
                    .emit(CoreEvent::Playback(PlaybackEvent::Paused { track_id }))
                    .ok();
                Ok(())
            }
            ToggleAction::Resume(handle, track_id) => {
                self.inner
                    .engine
                    .play(handle)
                    .await
                    .map_err(|e| PlaybackError::Engine(e.to_string()))?;
                self.inner.latest_status.lock().unwrap().is_playing = true;
                self.inner.state.lock().await.phase = PlayerState::Playing;
                self.inner
                    .events
                    .emit(CoreEvent::Playback(PlaybackEvent::Resumed { track_id }))
                    .ok();
                Ok(())
            }
            ToggleAction::Start(track, index) => self.load_and_play_locked(track, index).await,
            ToggleAction::Nothing => {
                debug!("Toggle with empty queue ignored");
                Ok(())
            }
        }
    }

    /// Advance to the next queue entry.
    ///
    /// Past the last entry the session stops: the handle is released, the
    /// current track and index are cleared, and `Stopped` is emitted.
    pub async fn skip_to_next(&self) -> Result<()> {
        let _transport = self.inner.transport.lock().await;
        self.advance_locked().await
    }

    /// Step back one queue entry, floored at the first.
    ///
    /// At index 0 this reloads the first track from the start.
    pub async fn skip_to_previous(&self) -> Result<()> {
        let _transport = self.inner.transport.lock().await;

        let target = {
            let state = self.inner.state.lock().await;
            let index = state.current_index.unwrap_or(0).saturating_sub(1);
            state.queue.get(index).cloned().map(|track| (track, index))
        };

        match target {
            Some((track, index)) => self.load_and_play_locked(track, index).await,
            None => {
                debug!("Skip previous with empty queue ignored");
                Ok(())
            }
        }
    }

    /// Move the playhead. A no-op without a live handle.
    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        let _transport = self.inner.transport.lock().await;

        let handle = self.inner.state.lock().await.handle;
        match handle {
            Some(handle) => self
                .inner
                .engine
                .seek(handle, position)
                .await
                .map_err(|e| PlaybackError::Engine(e.to_string())),
            None => {
                debug!("Seek without a live handle ignored");
                Ok(())
            }
        }
    }

    /// Current session view for the host UI.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock().await;
        SessionSnapshot {
            state: state.phase,
            current_track: state.current_track.clone(),
            current_index: state.current_index,
            queue_len: state.queue.len(),
            status: *self.inner.latest_status.lock().unwrap(),
        }
    }

    /// Copy of the current queue.
    pub async fn queue(&self) -> Vec<Track> {
        self.inner.state.lock().await.queue.clone()
    }

    /// The most recently loaded track, retained after the session empties.
    pub async fn last_played(&self) -> Option<Track> {
        self.inner.state.lock().await.last_played.clone()
    }

    /// Transition to the track at `index`, releasing any live handle first.
    ///
    /// Must be called with the transport lock held. A track that still has
    /// no preview source after the catalog backfill emits `TrackUnplayable`
    /// and leaves session state untouched.
    async fn load_and_play_locked(&self, mut track: Track, index: usize) -> Result<()> {
        if track.preview_url.is_none() {
            debug!(track_id = track.id, "No preview source, consulting catalog");
            match self
                .inner
                .catalog
                .find_preview(&track.title, &track.artist)
                .await
            {
                Ok(Some(url)) => {
                    track.preview_url = Some(url.clone());
                    let mut state = self.inner.state.lock().await;
                    if let Some(entry) = state.queue.get_mut(index) {
                        if entry.id == track.id {
                            entry.preview_url = Some(url);
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(track_id = track.id, error = %e, "Preview lookup failed");
                }
            }
        }

        let Some(url) = track.preview_url.clone() else {
            warn!(track_id = track.id, title = %track.title, "Track has no playable preview");
            self.inner
                .events
                .emit(CoreEvent::Playback(PlaybackEvent::TrackUnplayable {
                    track_id: track.id,
                    title: track.title.clone(),
                }))
                .ok();
            return Ok(());
        };

        // New generation; completions from earlier loads are now stale.
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.release_handle().await;
        self.inner.state.lock().await.phase = PlayerState::Loading;

        let handle = match self.inner.engine.load(AudioSource::remote(url), true).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(track_id = track.id, error = %e, "Audio load failed");
                self.inner.state.lock().await.phase = PlayerState::Empty;
                self.inner
                    .events
                    .emit(CoreEvent::Playback(PlaybackEvent::Error {
                        track_id: Some(track.id),
                        message: e.to_string(),
                        recoverable: true,
                    }))
                    .ok();
                return Err(PlaybackError::Engine(e.to_string()));
            }
        };

        let status_rx = match self.inner.engine.status_stream(handle).await {
            Ok(rx) => Some(rx),
            Err(e) => {
                warn!(%handle, error = %e, "Status stream unavailable, auto-advance disabled");
                None
            }
        };

        *self.inner.latest_status.lock().unwrap() = PlaybackStatus {
            position: Duration::ZERO,
            duration: None,
            is_playing: true,
            did_just_finish: false,
        };

        let watcher = status_rx.map(|rx| self.spawn_watcher(handle, rx, generation));

        {
            let mut state = self.inner.state.lock().await;
            state.handle = Some(handle);
            state.current_index = Some(index);
            state.current_track = Some(track.clone());
            state.last_played = Some(track.clone());
            state.watcher = watcher;
            state.phase = PlayerState::Playing;
        }

        info!(track_id = track.id, title = %track.title, "Playback started");
        self.inner
            .events
            .emit(CoreEvent::Playback(PlaybackEvent::Started {
                track_id: track.id,
                title: track.title,
            }))
            .ok();

        Ok(())
    }

    /// Load the entry after the current index, or stop at the queue's end.
    ///
    /// Must be called with the transport lock held.
    async fn advance_locked(&self) -> Result<()> {
        let next = {
            let state = self.inner.state.lock().await;
            let index = state.current_index.map_or(0, |i| i + 1);
            match state.queue.get(index) {
                Some(track) => Some((track.clone(), index)),
                None if state.handle.is_some() || state.current_track.is_some() => None,
                None => {
                    debug!("Skip with empty session ignored");
                    return Ok(());
                }
            }
        };

        match next {
            Some((track, index)) => self.load_and_play_locked(track, index).await,
            None => {
                self.stop_locked().await;
                Ok(())
            }
        }
    }

    /// Release the handle and empty the session.
    async fn stop_locked(&self) {
        self.release_handle().await;
        {
            let mut state = self.inner.state.lock().await;
            state.current_track = None;
            state.current_index = None;
            state.phase = PlayerState::Empty;
        }
        *self.inner.latest_status.lock().unwrap() = PlaybackStatus::stopped();

        info!("Playback stopped");
        self.inner
            .events
            .emit(CoreEvent::Playback(PlaybackEvent::Stopped))
            .ok();
    }

    /// Abort the watcher and unload the live handle, if any.
    async fn release_handle(&self) {
        let (handle, watcher) = {
            let mut state = self.inner.state.lock().await;
            (state.handle.take(), state.watcher.take())
        };

        if let Some(watcher) = watcher {
            watcher.abort();
        }

        if let Some(handle) = handle {
            if let Err(e) = self.inner.engine.unload(handle).await {
                warn!(%handle, error = %e, "Failed to unload audio handle");
            }
        }
    }

    /// Observe the engine's status stream for one handle.
    ///
    /// On `did_just_finish` the watcher triggers the advance exactly once
    /// and exits; the advance re-checks the generation under the transport
    /// lock, so a superseded completion is discarded.
    fn spawn_watcher(
        &self,
        handle: AudioHandleId,
        mut status_rx: broadcast::Receiver<PlaybackStatus>,
        generation: u64,
    ) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            loop {
                match status_rx.recv().await {
                    Ok(status) => {
                        let Some(strong) = inner.upgrade() else { return };
                        *strong.latest_status.lock().unwrap() = status;

                        if status.did_just_finish {
                            debug!(%handle, "Source finished");
                            let session = PlayerSession { inner: strong };
                            tokio::spawn(async move {
                                session.advance_after_completion(generation).await;
                            });
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(%handle, skipped, "Status stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        })
    }

    async fn advance_after_completion(&self, generation: u64) {
        let _transport = self.inner.transport.lock().await;

        if generation != self.inner.generation.load(Ordering::SeqCst) {
            debug!(generation, "Discarding stale completion");
            return;
        }

        let track_id = {
            let state = self.inner.state.lock().await;
            state.current_track.as_ref().map(|t| t.id)
        };
        if let Some(track_id) = track_id {
            self.inner
                .events
                .emit(CoreEvent::Playback(PlaybackEvent::Completed { track_id }))
                .ok();
        }

        if let Err(e) = self.advance_locked().await {
            warn!(error = %e, "Auto-advance failed");
        }
    }

    /// Persist the queue snapshot in the background.
    fn persist_queue(&self, tracks: Vec<Track>) {
        let store = self.inner.queue_store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(&tracks).await {
                warn!(error = %e, "Queue persistence failed");
            }
        });
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession").finish_non_exhaustive()
    }
}
