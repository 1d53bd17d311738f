//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cardline_core::HttpConfig;
use cardline_enrich::{EnrichConfig, MergeMode, SHEET_NAME, SchemaVersion};
use cardline_scryfall::MirrorConfig;
use cardline_scryfall::config::{DEFAULT_DATASET, DEFAULT_LISTING_URL};
use serde::Deserialize;

/// Global configuration for cardline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub mirror: MirrorSection,
    pub http: HttpSection,
    pub enrich: EnrichSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorSection {
    /// Where the card database and its marker live
    pub data_dir: PathBuf,
    pub listing_url: String,
    pub dataset: String,
}

impl Default for MirrorSection {
    fn default() -> Self {
        let data_dir = directories::ProjectDirs::from("", "", "cardline")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./data"));
        Self {
            data_dir,
            listing_url: DEFAULT_LISTING_URL.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
        }
    }
}

/// Timeouts in seconds
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub connect_timeout: u64,
    pub read_timeout: u64,
    pub request_timeout: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            connect_timeout: 30,
            read_timeout: 60,
            request_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichSection {
    pub mode: MergeMode,
    pub schema: SchemaVersion,
    pub sheet_name: String,
    pub default_output: PathBuf,
    pub progress_every: usize,
}

impl Default for EnrichSection {
    fn default() -> Self {
        Self {
            mode: MergeMode::default(),
            schema: SchemaVersion::default(),
            sheet_name: SHEET_NAME.to_string(),
            default_output: PathBuf::from("mtg_collection_enriched.xlsx"),
            progress_every: 50,
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./cardline.toml (current directory)
    /// 2. ~/.config/cardline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("cardline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "cardline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn mirror_config(&self) -> MirrorConfig {
        MirrorConfig {
            listing_url: self.mirror.listing_url.clone(),
            dataset: self.mirror.dataset.clone(),
            ..MirrorConfig::with_data_dir(&self.mirror.data_dir)
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: Duration::from_secs(self.http.connect_timeout),
            read_timeout: Duration::from_secs(self.http.read_timeout),
            request_timeout: Duration::from_secs(self.http.request_timeout),
            ..Default::default()
        }
    }

    pub fn enrich_config(&self) -> EnrichConfig {
        EnrichConfig {
            mode: self.enrich.mode,
            schema: self.enrich.schema,
            sheet_name: self.enrich.sheet_name.clone(),
            progress_every: self.enrich.progress_every,
            ..Default::default()
        }
    }
}
