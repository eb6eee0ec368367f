//! Workspace façade crate.
//!
//! Host applications can depend on `preview-core` alone: it re-exports the
//! service façade and maps the documented feature flags onto the individual
//! workspace crates, so nothing needs to be wired crate by crate.

pub use core_service::{AppCore, CoreDependencies, CoreError, RestoreSummary, Result};

#[cfg(feature = "desktop-shims")]
pub use core_service::{JsonFileSettingsStore, KeyringSecureStore, ReqwestHttpClient};
