//! Secure Credential Storage
//!
//! Persists the credential record through the platform [`SecureStore`]
//! under distinct versioned keys, so future schema changes can add keys
//! without colliding with old installs.
//!
//! ## Behavior
//!
//! - Absent keys mean "first run" and are never an error
//! - Corrupted values are logged, deleted, and treated as absent
//! - Token values never appear in logs or error messages

use crate::error::{AuthError, Result};
use crate::types::{OAuthTokens, UserProfile};
use bridge_traits::storage::SecureStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

const KEY_ACCESS_TOKEN: &str = "auth.access_token.v1";
const KEY_REFRESH_TOKEN: &str = "auth.refresh_token.v1";
const KEY_TOKEN_EXPIRY: &str = "auth.token_expiry.v1";
const KEY_PROFILE: &str = "auth.profile.v1";

/// Secure storage for the credential record.
#[derive(Clone)]
pub struct CredentialStore {
    secure_store: Arc<dyn SecureStore>,
}

impl CredentialStore {
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        Self { secure_store }
    }

    /// Store a token set, replacing any previous one.
    pub async fn store_tokens(&self, tokens: &OAuthTokens) -> Result<()> {
        self.set(KEY_ACCESS_TOKEN, &tokens.access_token).await?;
        self.set(KEY_TOKEN_EXPIRY, &tokens.expires_at_unix().to_string())
            .await?;

        match &tokens.refresh_token {
            Some(refresh) => self.set(KEY_REFRESH_TOKEN, refresh).await?,
            None => self.delete(KEY_REFRESH_TOKEN).await?,
        }

        info!(
            has_refresh_token = tokens.refresh_token.is_some(),
            expires_at = tokens.expires_at_unix(),
            "Tokens stored securely"
        );

        Ok(())
    }

    /// Load the persisted token set.
    ///
    /// Returns `Ok(None)` when no tokens are stored. A corrupted expiry
    /// value deletes the whole record and also yields `Ok(None)`.
    pub async fn load_tokens(&self) -> Result<Option<OAuthTokens>> {
        let Some(access_token) = self.get(KEY_ACCESS_TOKEN).await? else {
            debug!("No access token in storage");
            return Ok(None);
        };

        let Some(expiry_raw) = self.get(KEY_TOKEN_EXPIRY).await? else {
            warn!("Access token present but expiry missing, clearing record");
            self.clear().await?;
            return Ok(None);
        };

        let expires_at_unix: i64 = match expiry_raw.parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("Corrupted token expiry value, clearing record");
                self.clear().await?;
                return Ok(None);
            }
        };

        let refresh_token = self.get(KEY_REFRESH_TOKEN).await?;

        Ok(Some(OAuthTokens::from_parts(
            access_token,
            refresh_token,
            expires_at_unix,
        )))
    }

    /// Store the cached user profile.
    pub async fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)
            .map_err(|e| AuthError::Internal(format!("Failed to serialize profile: {}", e)))?;
        self.set(KEY_PROFILE, &json).await
    }

    /// Load the cached user profile.
    ///
    /// A corrupted value is deleted and treated as absent.
    pub async fn load_profile(&self) -> Result<Option<UserProfile>> {
        let Some(json) = self.get(KEY_PROFILE).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "Corrupted cached profile, deleting");
                self.delete(KEY_PROFILE).await?;
                Ok(None)
            }
        }
    }

    /// Delete the entire credential record. Idempotent.
    pub async fn clear(&self) -> Result<()> {
        for key in [
            KEY_ACCESS_TOKEN,
            KEY_REFRESH_TOKEN,
            KEY_TOKEN_EXPIRY,
            KEY_PROFILE,
        ] {
            self.delete(key).await?;
        }
        info!("Credential record cleared");
        Ok(())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.secure_store.set_secret(key, value).await.map_err(|e| {
            warn!(key, error = %e, "Secure store write failed");
            AuthError::SecureStorage(e.to_string())
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.secure_store.get_secret(key).await.map_err(|e| {
            warn!(key, error = %e, "Secure store read failed");
            AuthError::SecureStorage(e.to_string())
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.secure_store.delete_secret(key).await.map_err(|e| {
            warn!(key, error = %e, "Secure store delete failed");
            AuthError::SecureStorage(e.to_string())
        })
    }
}
