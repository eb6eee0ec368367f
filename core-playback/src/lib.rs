//! # Core Playback
//!
//! Playback queue and session state for the preview player. The session
//! drives the host's [`AudioEngine`](bridge_traits::audio::AudioEngine)
//! through opaque handles, keeps at most one instance live, auto-advances
//! when a preview finishes, and persists the queue across restarts.

pub mod error;
pub mod queue;
pub mod session;

pub use error::{PlaybackError, Result};
pub use queue::QueueStore;
pub use session::{PlayerSession, PlayerState, SessionSnapshot};
