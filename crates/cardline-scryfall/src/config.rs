//! Mirror configuration

use std::path::PathBuf;
use std::time::Duration;

/// Scryfall bulk data listing endpoint
pub const DEFAULT_LISTING_URL: &str = "https://api.scryfall.com/bulk-data";

/// Listing entry type of the complete card set
pub const DEFAULT_DATASET: &str = "default_cards";

/// Where the mirror lives and which remote dataset it tracks
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Directory holding the payload and marker files
    pub data_dir: PathBuf,
    /// Bulk listing endpoint
    pub listing_url: String,
    /// `type` of the listing entry to mirror
    pub dataset: String,
    /// Payload filename, stored verbatim
    pub payload_file: String,
    /// Freshness marker filename (plain-text timestamp)
    pub marker_file: String,
    /// Minimum spacing of throughput/ETA status lines during download
    pub eta_interval: Duration,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            payload_file: "default-cards.json".to_string(),
            marker_file: "bulk_meta.txt".to_string(),
            eta_interval: Duration::from_secs(5),
        }
    }
}

impl MirrorConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn payload_path(&self) -> PathBuf {
        self.data_dir.join(&self.payload_file)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.data_dir.join(&self.marker_file)
    }
}
