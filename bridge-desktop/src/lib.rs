//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop platforms
//! (macOS, Windows, Linux):
//!
//! - `HttpClient` using `reqwest`
//! - `SecureStore` using the OS keychain via the `keyring` crate
//! - `SettingsStore` as a JSON file
//!
//! No `AudioEngine` is provided; audio decoding belongs to the host.
//!
//! ## Feature Flags
//!
//! - `secure-store`: OS keychain integration (default)

mod http;
mod settings;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;
pub use settings::JsonFileSettingsStore;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
