//! Enrichment configuration

use crate::merge::MergeMode;
use crate::schema::{SHEET_NAME, SchemaVersion};

/// Settings for one enrich-and-merge pass
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub mode: MergeMode,
    pub schema: SchemaVersion,
    /// Output worksheet name; also the preferred sheet when reading prior output
    pub sheet_name: String,
    /// Emit a "done/total" status line every N enriched rows
    pub progress_every: usize,
    /// Extra characters added to each fitted column width
    pub column_padding: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            mode: MergeMode::default(),
            schema: SchemaVersion::default(),
            sheet_name: SHEET_NAME.to_string(),
            progress_every: 50,
            column_padding: 2,
        }
    }
}
