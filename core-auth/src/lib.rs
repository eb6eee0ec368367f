//! # Credential Management
//!
//! OAuth 2.0 authorization-code flow with PKCE, secure token persistence,
//! and transparent access-token refresh.
//!
//! ## Overview
//!
//! The [`CredentialManager`] owns the whole credential lifecycle:
//!
//! 1. [`begin_authorization`](CredentialManager::begin_authorization) builds
//!    a PKCE-protected authorization URL for the host to open
//! 2. [`complete_authorization`](CredentialManager::complete_authorization)
//!    validates the callback and exchanges the code for tokens
//! 3. [`authorization_header`](CredentialManager::authorization_header)
//!    hands out `Bearer` headers, refreshing expiring tokens on demand
//! 4. [`sign_out`](CredentialManager::sign_out) wipes everything
//!
//! Authorization is always optional for callers: a missing or unrefreshable
//! credential yields `None`, never an error, so unauthenticated features
//! keep working.
//!
//! ## Security
//!
//! Tokens are persisted only through the [`SecureStore`] bridge and never
//! appear in logs; `Debug` for token types redacts.
//!
//! [`SecureStore`]: bridge_traits::SecureStore

pub mod error;
pub mod manager;
pub mod oauth;
pub mod store;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::CredentialManager;
pub use oauth::{OAuthFlowManager, PkceVerifier};
pub use store::CredentialStore;
pub use types::{AuthState, OAuthTokens, UserProfile};
