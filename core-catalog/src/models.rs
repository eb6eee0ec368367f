//! Catalog data model.
//!
//! Field names follow the catalog's wire format so persisted queue snapshots
//! round-trip through the same serde definitions.

use serde::{Deserialize, Serialize};

/// A single track as returned by the catalog search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog track identifier
    #[serde(rename = "trackId")]
    pub id: u64,

    /// Track title
    #[serde(rename = "trackName")]
    pub title: String,

    /// Artist name
    #[serde(rename = "artistName")]
    pub artist: String,

    /// Album name; empty when the catalog omits it
    #[serde(rename = "collectionName", default)]
    pub album: String,

    /// Album artwork URL (100x100 variant)
    #[serde(rename = "artworkUrl100", default)]
    pub artwork_url: Option<String>,

    /// Preview stream URL; absent for tracks without a hosted preview
    #[serde(rename = "previewUrl", default)]
    pub preview_url: Option<String>,
}

/// Top-level search response envelope.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "resultCount", default)]
    pub result_count: u32,

    #[serde(default)]
    pub results: Vec<Track>,
}
