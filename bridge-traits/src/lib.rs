//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the preview-player core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be provided differently per platform (desktop,
//! iOS, Android):
//!
//! - [`HttpClient`](http::HttpClient) - async HTTP for catalog search, token
//!   exchange, and profile fetches
//! - [`SecureStore`](storage::SecureStore) - credential persistence
//!   (Keychain/Keystore)
//! - [`SettingsStore`](storage::SettingsStore) - durable key-value cache for
//!   non-secret snapshots (e.g. the playback queue)
//! - [`AudioEngine`](audio::AudioEngine) - the host's audio subsystem; the
//!   core drives it through opaque handles and observes a status stream
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert native errors into it with actionable
//! messages and never expose secrets in error text.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`; implementations must be safe to share
//! across async tasks behind an `Arc`.

pub mod audio;
pub mod error;
pub mod http;
pub mod storage;

pub use audio::{AudioEngine, AudioHandleId, AudioSource, PlaybackStatus};
pub use error::BridgeError;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{SecureStore, SettingsStore};
