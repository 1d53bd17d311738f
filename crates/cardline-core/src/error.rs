//! Error taxonomy shared by every pipeline stage

use std::path::PathBuf;

use crate::stream::StreamError;

/// Failure of one enrichment run (sync, index, enrich, merge, or write).
///
/// A lookup miss for a single row is not an error: the row degrades to
/// blank enrichment fields and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bulk listing unreachable, malformed, or missing the expected entry.
    #[error("card service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Transport failure while streaming the bulk payload.
    /// The previous mirror and marker are left untouched.
    #[error("card database download failed: {0}")]
    DownloadFailed(#[source] StreamError),

    #[error(
        "card database not found at {}; run `cardline sync` to download it",
        .path.display()
    )]
    MirrorNotFound { path: PathBuf },

    #[error(
        "card database at {} is unreadable ({message}); run `cardline sync --force` to re-download it",
        .path.display()
    )]
    MirrorCorrupt { path: PathBuf, message: String },

    /// Required input column absent. Raised before any enrichment.
    #[error("required column '{column}' missing from {}", .path.display())]
    SchemaInvalid { column: String, path: PathBuf },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spreadsheet error in {}: {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn spreadsheet(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Spreadsheet {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether re-downloading the card database is the remedy.
    pub fn needs_resync(&self) -> bool {
        matches!(
            self,
            Self::DownloadFailed(_) | Self::MirrorNotFound { .. } | Self::MirrorCorrupt { .. }
        )
    }

    /// Short stable label for summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "service-unavailable",
            Self::DownloadFailed(_) => "download-failed",
            Self::MirrorNotFound { .. } => "mirror-not-found",
            Self::MirrorCorrupt { .. } => "mirror-corrupt",
            Self::SchemaInvalid { .. } => "schema-invalid",
            Self::Io { .. } => "io",
            Self::Spreadsheet { .. } => "spreadsheet",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn mirror_not_found_is_actionable() {
        let err = Error::MirrorNotFound {
            path: PathBuf::from("/data/default-cards.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/default-cards.json"));
        assert!(msg.contains("cardline sync"));
        assert!(err.needs_resync());
    }

    #[test]
    fn mirror_corrupt_differs_from_not_found() {
        let err = Error::MirrorCorrupt {
            path: PathBuf::from("cards.json"),
            message: "EOF while parsing".into(),
        };
        assert_eq!(err.kind(), "mirror-corrupt");
        assert!(err.to_string().contains("EOF while parsing"));
        assert!(err.to_string().contains("--force"));
    }

    #[test]
    fn schema_invalid_names_column() {
        let err = Error::SchemaInvalid {
            column: "Scryfall ID".into(),
            path: PathBuf::from("export.csv"),
        };
        assert_eq!(
            err.to_string(),
            "required column 'Scryfall ID' missing from export.csv"
        );
        assert!(!err.needs_resync());
    }

    #[test]
    fn download_failed_keeps_source() {
        let err = Error::DownloadFailed(StreamError::Http {
            status: Some(503),
            message: "unavailable".into(),
        });
        assert!(err.to_string().contains("HTTP 503"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.needs_resync());
    }

    #[test]
    fn service_unavailable_not_resync() {
        let err = Error::ServiceUnavailable("connection refused".into());
        assert!(!err.needs_resync());
        assert_eq!(err.kind(), "service-unavailable");
    }

    #[test]
    fn io_display_includes_path() {
        let err = Error::io("out.xlsx", std::io::Error::new(ErrorKind::PermissionDenied, "denied"));
        assert!(err.to_string().starts_with("out.xlsx:"));
    }
}
