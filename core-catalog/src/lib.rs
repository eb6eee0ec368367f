//! # Catalog Search
//!
//! Read-only client for an iTunes-style track catalog. The client issues
//! keyword searches and resolves preview stream locators; it performs no
//! caching and requires no credentials.

pub mod client;
pub mod error;
pub mod models;

pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use models::Track;
