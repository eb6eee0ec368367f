//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the preview player core:
//! - Logging and tracing bootstrap
//! - Static API configuration
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the domain crates depend
//! on. It establishes the logging conventions, the typed event broadcasting
//! mechanism a host UI subscribes to, and the validated endpoint
//! configuration shared by the catalog and credential components.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
