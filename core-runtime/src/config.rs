//! # Core Configuration Module
//!
//! Static configuration for the preview player core: where the catalog lives
//! and which OAuth provider issues credentials. Bridge implementations are
//! injected separately through the service facade; this module only carries
//! validated endpoint settings.
//!
//! ## Security Note
//!
//! The OAuth client ID is public by design in a PKCE flow, but it should
//! still be loaded from the host's configuration system rather than
//! hardcoded in the binary.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::{CoreConfig, CatalogApiConfig, AuthApiConfig};
//!
//! let config = CoreConfig::new(
//!     CatalogApiConfig::default(),
//!     AuthApiConfig::new("my-client-id", "myapp://callback"),
//! );
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};

/// Configuration for the track catalog search API.
///
/// Defaults target the iTunes Search API, which requires no credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogApiConfig {
    /// Search endpoint base URL
    pub base_url: String,
    /// Two-letter storefront country code
    pub country: String,
    /// Entity kind to search for
    pub entity: String,
    /// Result limit applied when the caller does not specify one
    pub default_limit: u32,
}

impl Default for CatalogApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://itunes.apple.com/search".to_string(),
            country: "US".to_string(),
            entity: "musicTrack".to_string(),
            default_limit: 25,
        }
    }
}

impl CatalogApiConfig {
    /// Sets the search endpoint base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the storefront country code
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Sets the entity kind
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    /// Sets the default result limit
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(
                "Catalog base URL must be an http(s) URL".to_string(),
            ));
        }

        if self.country.len() != 2 {
            return Err(Error::Config(
                "Catalog country must be a two-letter code".to_string(),
            ));
        }

        if self.entity.is_empty() {
            return Err(Error::Config("Catalog entity cannot be empty".to_string()));
        }

        if self.default_limit == 0 || self.default_limit > 50 {
            return Err(Error::Config(
                "Catalog default limit must be between 1 and 50".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration for the OAuth authorization provider.
///
/// Defaults target the Spotify accounts service; only the client ID and
/// redirect URI are deployment-specific.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthApiConfig {
    /// Public OAuth client identifier
    pub client_id: String,
    /// Redirect URI registered with the provider
    pub redirect_uri: String,
    /// Authorization endpoint the host opens in a browser
    pub authorize_endpoint: String,
    /// Token exchange endpoint
    pub token_endpoint: String,
    /// Profile endpoint for the signed-in user
    pub profile_endpoint: String,
    /// Requested scopes
    pub scopes: Vec<String>,
}

impl AuthApiConfig {
    /// Creates a provider configuration with the default Spotify endpoints.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            authorize_endpoint: "https://accounts.spotify.com/authorize".to_string(),
            token_endpoint: "https://accounts.spotify.com/api/token".to_string(),
            profile_endpoint: "https://api.spotify.com/v1/me".to_string(),
            scopes: vec![
                "user-read-email".to_string(),
                "user-read-private".to_string(),
            ],
        }
    }

    /// Sets the authorization endpoint
    pub fn with_authorize_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorize_endpoint = endpoint.into();
        self
    }

    /// Sets the token endpoint
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Sets the profile endpoint
    pub fn with_profile_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.profile_endpoint = endpoint.into();
        self
    }

    /// Sets the requested scopes
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::Config("OAuth client ID cannot be empty".to_string()));
        }

        if self.redirect_uri.is_empty() {
            return Err(Error::Config(
                "OAuth redirect URI cannot be empty".to_string(),
            ));
        }

        for (name, endpoint) in [
            ("authorize", &self.authorize_endpoint),
            ("token", &self.token_endpoint),
            ("profile", &self.profile_endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(Error::Config(format!(
                    "OAuth {} endpoint must be an http(s) URL",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Combined static configuration handed to the service facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Catalog search settings
    pub catalog: CatalogApiConfig,
    /// OAuth provider settings
    pub auth: AuthApiConfig,
}

impl CoreConfig {
    pub fn new(catalog: CatalogApiConfig, auth: AuthApiConfig) -> Self {
        Self { catalog, auth }
    }

    /// Validates all sections
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}
