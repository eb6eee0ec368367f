//! Catalog API Client
//!
//! Searches an iTunes-style catalog for tracks. The endpoint requires no
//! credentials and responses are never cached; every search is a fresh
//! request.
//!
//! ## Usage
//!
//! ```ignore
//! use core_catalog::CatalogClient;
//! use core_runtime::config::CatalogApiConfig;
//!
//! let client = CatalogClient::new(http_client, CatalogApiConfig::default());
//! let tracks = client.search("radiohead", None).await?;
//! ```

use crate::error::{CatalogError, Result};
use crate::models::{SearchResponse, Track};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_runtime::config::CatalogApiConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Search terms shorter than this (after trimming) short-circuit to an empty
/// result without issuing a request.
const MIN_TERM_LEN: usize = 2;

/// Hard cap the catalog enforces on result counts.
const MAX_LIMIT: u32 = 50;

/// Timeout for catalog requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Catalog search client.
pub struct CatalogClient {
    http_client: Arc<dyn HttpClient>,
    config: CatalogApiConfig,
}

impl CatalogClient {
    /// Creates a new catalog client.
    pub fn new(http_client: Arc<dyn HttpClient>, config: CatalogApiConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Searches the catalog for tracks matching `term`.
    ///
    /// The term is trimmed before use. Terms shorter than two characters
    /// return an empty list without touching the network. `limit` defaults
    /// to the configured value and is clamped to the catalog's 1..=50 range.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Network`] when the request cannot be completed
    /// - [`CatalogError::Http`] on a non-2xx response
    /// - [`CatalogError::Response`] when the body is not a valid search result
    pub async fn search(&self, term: &str, limit: Option<u32>) -> Result<Vec<Track>> {
        let term = term.trim();
        if term.chars().count() < MIN_TERM_LEN {
            debug!(term_len = term.len(), "Search term below minimum, skipping request");
            return Ok(Vec::new());
        }

        let limit = limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, MAX_LIMIT);

        let query = serde_urlencoded::to_string([
            ("term", term),
            ("country", self.config.country.as_str()),
            ("entity", self.config.entity.as_str()),
            ("limit", limit.to_string().as_str()),
        ])
        .map_err(|e| CatalogError::Response(format!("Failed to encode query: {}", e)))?;

        let url = format!("{}?{}", self.config.base_url, query);
        debug!(%limit, "Searching catalog");

        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| CatalogError::Network(format!("Catalog request failed: {}", e)))?;

        if !response.is_success() {
            warn!(status = response.status, "Catalog search failed");
            return Err(CatalogError::Http {
                status: response.status,
            });
        }

        let parsed: SearchResponse = serde_json::from_slice(&response.body).map_err(|e| {
            CatalogError::Response(format!("Failed to parse search response: {}", e))
        })?;

        debug!(
            result_count = parsed.result_count,
            "Catalog search completed"
        );

        Ok(parsed.results)
    }

    /// Resolves a preview stream locator for a track by title and artist.
    ///
    /// Issues a single limit-1 search on `"{title} {artist}"` and returns the
    /// first hit's preview URL, if any. Used to backfill tracks that arrive
    /// without a preview source.
    pub async fn find_preview(&self, title: &str, artist: &str) -> Result<Option<String>> {
        let term = format!("{} {}", title, artist);
        let results = self.search(&term, Some(1)).await?;
        Ok(results.into_iter().next().and_then(|t| t.preview_url))
    }
}
