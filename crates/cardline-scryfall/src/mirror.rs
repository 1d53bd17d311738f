//! Local mirror of the bulk card payload
//!
//! Two files live in the data dir: the payload, stored verbatim, and a
//! plain-text marker holding the remote `updated_at` of the snapshot the
//! payload came from. The marker is only ever written after the payload
//! has been fully downloaded and renamed into place.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use cardline_core::{
    EtaReporter, Error, HttpConfig, Phase, ProgressSink, Result, build_client, commit,
    download_to_file, fmt_num, remove_stale_tmp, tmp_path, write_atomic,
};
use indicatif::HumanBytes;

use crate::bulk::{Snapshot, fetch_snapshot};
use crate::config::MirrorConfig;

/// Result of [`Mirror::ensure_fresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local marker matched the remote snapshot
    UpToDate,
    /// Payload was (re)downloaded
    Downloaded { bytes: u64 },
}

/// Local state of the mirror, read without touching the network
#[derive(Debug, Clone)]
pub struct MirrorStatus {
    pub payload_path: PathBuf,
    /// `None` if the payload file is absent
    pub payload_bytes: Option<u64>,
    /// `None` if the marker file is absent
    pub marker: Option<String>,
}

impl MirrorStatus {
    pub fn is_present(&self) -> bool {
        self.payload_bytes.is_some() && self.marker.is_some()
    }
}

/// Mirror of one remote bulk dataset
pub struct Mirror {
    config: MirrorConfig,
    http: HttpConfig,
    client: reqwest::Client,
}

impl Mirror {
    pub fn new(config: MirrorConfig, http: HttpConfig) -> Result<Self> {
        let client = build_client(&http)
            .map_err(|e| Error::ServiceUnavailable(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http,
            client,
        })
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn payload_path(&self) -> PathBuf {
        self.config.payload_path()
    }

    /// Query the listing for the current remote snapshot.
    pub fn check_freshness(&self) -> Result<Snapshot> {
        log::debug!("Fetching bulk listing from {}", self.config.listing_url);
        fetch_snapshot(
            &self.client,
            &self.config.listing_url,
            &self.config.dataset,
            self.http.request_timeout,
        )
    }

    /// Marker text with line terminators stripped, `None` if absent or unreadable.
    pub fn local_marker(&self) -> Option<String> {
        let path = self.config.marker_path();
        match fs::read_to_string(&path) {
            Ok(text) => Some(text.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Cannot read marker {}: {e}", path.display());
                None
            }
        }
    }

    /// True if the payload or marker is missing, or the marker differs from
    /// `remote_updated_at`. Comparison is exact string equality.
    pub fn is_stale(&self, remote_updated_at: &str) -> bool {
        if !self.payload_path().is_file() {
            return true;
        }
        match self.local_marker() {
            Some(marker) => marker != remote_updated_at,
            None => true,
        }
    }

    /// Download the snapshot payload, then record its timestamp.
    ///
    /// Streams into `<payload>.tmp`, renames over the payload once complete,
    /// and only then writes the marker. On failure the tmp file is removed
    /// and the previous payload and marker stay as they were.
    pub fn refresh(&self, snapshot: &Snapshot, sink: &dyn ProgressSink) -> Result<u64> {
        let payload = self.payload_path();
        fs::create_dir_all(&self.config.data_dir)
            .map_err(|e| Error::io(&self.config.data_dir, e))?;
        let tmp = tmp_path(&payload);
        remove_stale_tmp(&tmp).map_err(|e| Error::io(&tmp, e))?;

        sink.begin_phase(Phase::Download);
        let started = Instant::now();
        let mut eta = EtaReporter::starting_at(started, self.config.eta_interval);
        let fallback_total = snapshot.size;

        let result = download_to_file(
            &self.client,
            &snapshot.download_uri,
            &tmp,
            self.http.read_timeout,
            |done, total| {
                let total = total.or(fallback_total);
                sink.report_progress(done, total.unwrap_or(0));
                if let Some(line) = eta.poll(Instant::now(), done, total) {
                    sink.report(&line);
                }
            },
        );

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Err(rm) = fs::remove_file(&tmp) {
                    if rm.kind() != io::ErrorKind::NotFound {
                        log::warn!("Cannot remove {}: {rm}", tmp.display());
                    }
                }
                return Err(Error::DownloadFailed(e));
            }
        };

        commit(&tmp, &payload).map_err(|e| Error::io(&payload, e))?;
        let marker = self.config.marker_path();
        write_atomic(&marker, snapshot.updated_at.as_bytes()).map_err(|e| Error::io(&marker, e))?;

        sink.report(&format!(
            "Downloaded {} in {:.1}s",
            HumanBytes(bytes),
            started.elapsed().as_secs_f64()
        ));
        log::debug!("Mirror marker set to {}", snapshot.updated_at);
        Ok(bytes)
    }

    /// Check the remote snapshot and download it if the mirror is stale.
    ///
    /// `force` downloads regardless of the marker.
    pub fn ensure_fresh(&self, force: bool, sink: &dyn ProgressSink) -> Result<SyncOutcome> {
        sink.report("Checking card database freshness...");
        let snapshot = self.check_freshness()?;

        if !force && !self.is_stale(&snapshot.updated_at) {
            sink.report(&format!(
                "Card database is up-to-date ({})",
                snapshot.updated_at
            ));
            return Ok(SyncOutcome::UpToDate);
        }

        let reason = if force {
            "forced"
        } else if self.local_marker().is_none() || !self.payload_path().is_file() {
            "missing"
        } else {
            "outdated"
        };
        let size = snapshot
            .size
            .map(|s| format!(" ({})", HumanBytes(s)))
            .unwrap_or_default();
        sink.report(&format!(
            "Card database {reason}, downloading snapshot {}{size}...",
            snapshot.updated_at
        ));

        let bytes = self.refresh(&snapshot, sink)?;
        Ok(SyncOutcome::Downloaded { bytes })
    }

    pub fn status(&self) -> MirrorStatus {
        let payload_path = self.payload_path();
        let payload_bytes = fs::metadata(&payload_path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len());
        let status = MirrorStatus {
            payload_path,
            payload_bytes,
            marker: self.local_marker(),
        };
        if let Some(bytes) = status.payload_bytes {
            log::debug!("Mirror payload: {} bytes", fmt_num(bytes as usize));
        }
        status
    }
}
