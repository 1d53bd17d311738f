//! Scryfall bulk-data listing
//!
//! The listing endpoint describes each downloadable dataset. Only the
//! entry for the complete card set is used; its `updated_at` is the
//! freshness marker and `download_uri` the payload location.

use std::time::Duration;

use cardline_core::{Error, StreamError, get_text};
use serde::Deserialize;

/// Response of the bulk-data listing endpoint
#[derive(Debug, Deserialize)]
pub struct BulkListing {
    pub data: Vec<BulkEntry>,
}

/// One downloadable dataset
#[derive(Debug, Clone, Deserialize)]
pub struct BulkEntry {
    /// Dataset type (e.g. "default_cards", "oracle_cards")
    #[serde(rename = "type")]
    pub kind: String,
    /// Snapshot timestamp, treated as an opaque string
    pub updated_at: String,
    /// Payload URL
    pub download_uri: String,
    /// Declared payload size in bytes
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Remote state of the mirrored dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub updated_at: String,
    pub download_uri: String,
    pub size: Option<u64>,
}

impl From<&BulkEntry> for Snapshot {
    fn from(entry: &BulkEntry) -> Self {
        Self {
            updated_at: entry.updated_at.clone(),
            download_uri: entry.download_uri.clone(),
            size: entry.size,
        }
    }
}

impl BulkListing {
    /// Parse listing from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The single entry of the given type
    pub fn find(&self, kind: &str) -> Option<&BulkEntry> {
        self.data.iter().find(|e| e.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Fetch the listing and select the `dataset` entry.
///
/// Every failure (unreachable, bad status, malformed body, missing entry)
/// is `ServiceUnavailable`.
pub fn fetch_snapshot(
    client: &reqwest::Client,
    listing_url: &str,
    dataset: &str,
    timeout: Duration,
) -> Result<Snapshot, Error> {
    let body = get_text(client, listing_url, timeout).map_err(|e: StreamError| {
        Error::ServiceUnavailable(format!("cannot reach {listing_url}: {e}"))
    })?;
    let listing = BulkListing::from_json(&body)
        .map_err(|e| Error::ServiceUnavailable(format!("malformed bulk listing: {e}")))?;
    log::debug!("Bulk listing has {} entries", listing.len());

    let entry = listing.find(dataset).ok_or_else(|| {
        Error::ServiceUnavailable(format!("no '{dataset}' entry in bulk listing"))
    })?;
    Ok(Snapshot::from(entry))
}
