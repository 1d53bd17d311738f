//! Merge & dedup engine
//!
//! Combines newly enriched input rows with a previously written output.
//! In incremental mode an identifier already present in the prior output
//! is never enriched again; duplicates inside a single input are kept
//! (they are separate physical copies).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use cardline_core::{Error, Phase, ProgressSink, fmt_num};
use cardline_scryfall::LookupIndex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::EnrichConfig;
use crate::enrich::Enricher;
use crate::frame::Frame;
use crate::input::InputTable;
use crate::schema::Schema;
use crate::xlsx::{read_prior, write_workbook};

/// Which input rows get enriched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Only rows whose key is absent from the prior output
    #[default]
    Incremental,
    /// Every input row, whether or not the prior output holds its key
    Full,
}

impl MergeMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "incremental" => Ok(Self::Incremental),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown merge mode '{other}' (expected incremental or full)")),
        }
    }
}

/// Apply legacy header renames, then collapse duplicate names to the first.
pub fn normalize(frame: &mut Frame, schema: &Schema) {
    for (from, to) in &schema.renames {
        if frame.rename_column(from, to) > 0 {
            log::debug!("Renamed column '{from}' to '{to}'");
        }
    }
    for name in frame.dedup_columns() {
        log::debug!("Dropped duplicate column '{name}'");
    }
}

/// Keys already present in `frame`'s key column
pub fn prior_keys(frame: &Frame, key_column: &str) -> FxHashSet<String> {
    frame
        .column(key_column)
        .map(|cells| cells.filter_map(|c| c.as_key()).collect())
        .unwrap_or_default()
}

/// Merged table plus counts, before writing
#[derive(Debug)]
pub struct Merged {
    /// Exactly the canonical columns, prior rows first
    pub frame: Frame,
    pub prior_rows: usize,
    pub enriched: usize,
    pub misses: usize,
}

/// Enrich the selected input rows and append them to `prior`.
///
/// Pure apart from progress notifications.
pub fn merge(
    prior: Option<Frame>,
    mut input: Frame,
    index: &LookupIndex,
    schema: &Schema,
    config: &EnrichConfig,
    sink: &dyn ProgressSink,
) -> Merged {
    normalize(&mut input, schema);
    let prior = prior.map(|mut p| {
        normalize(&mut p, schema);
        p
    });
    let prior_rows = prior.as_ref().map_or(0, Frame::len);

    // Rows to enrich
    let key = input.column_index(schema.key_column);
    if let (MergeMode::Incremental, Some(prior)) = (config.mode, &prior) {
        let seen = prior_keys(prior, schema.key_column);
        if let Some(key) = key {
            input.retain_rows(|row| row[key].as_key().map_or(true, |k| !seen.contains(&k)));
        }
    }
    sink.report(&format!("New cards: {}", fmt_num(input.len())));

    // Enrichment pass, in lock-step with the selected rows
    sink.begin_phase(Phase::Enrich);
    let enricher = Enricher::new(index, schema);
    let total = input.len();
    let mut meta = Frame::new(schema.enrichment_columns());
    let mut misses = 0;
    for (i, row) in input.rows().iter().enumerate() {
        let enrichment = match key.and_then(|k| row[k].as_key()) {
            Some(k) => enricher.enrich(&k),
            None => enricher.enrich(""),
        };
        if !enrichment.found {
            misses += 1;
        }
        meta.push_row(enrichment.cells);

        let done = i + 1;
        sink.report_progress(done as u64, total as u64);
        if config.progress_every > 0 && done % config.progress_every == 0 {
            sink.report(&format!("{done}/{total}"));
        }
    }
    if misses > 0 {
        log::warn!("{misses} of {total} cards not found in card database");
    }

    let mut combined = meta.hconcat(input);
    normalize(&mut combined, schema);
    let mut all = match prior {
        Some(prior) => prior.vconcat(combined),
        None => combined,
    };
    normalize(&mut all, schema);

    Merged {
        frame: all.conform(schema.columns.as_slice()),
        prior_rows,
        enriched: total,
        misses,
    }
}

/// Summary of one merge-and-write pass
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub mode: MergeMode,
    pub input_rows: usize,
    /// Input rows dropped for lacking the key
    pub skipped_rows: usize,
    pub prior_rows: usize,
    pub enriched_rows: usize,
    pub lookup_misses: usize,
    pub total_rows: usize,
    pub destination: PathBuf,
    pub elapsed: Duration,
}

impl MergeReport {
    pub fn log(&self) {
        log::info!("=== Enrichment Summary ===");
        log::info!("Mode: {}", self.mode);
        log::info!(
            "Input: {} rows ({} skipped)",
            fmt_num(self.input_rows),
            fmt_num(self.skipped_rows)
        );
        log::info!(
            "Enriched: {} ({} not found)",
            fmt_num(self.enriched_rows),
            fmt_num(self.lookup_misses)
        );
        log::info!(
            "Output: {} rows ({} prior) -> {}",
            fmt_num(self.total_rows),
            fmt_num(self.prior_rows),
            self.destination.display()
        );
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Load the prior output (if any), merge, and write `destination`.
///
/// A missing `prior_path` file means no prior output.
pub fn merge_and_write(
    prior_path: Option<&Path>,
    input: InputTable,
    index: &LookupIndex,
    destination: &Path,
    config: &EnrichConfig,
    sink: &dyn ProgressSink,
) -> Result<MergeReport, Error> {
    let start = Instant::now();
    let schema = Schema::new(config.schema);

    let prior = match prior_path {
        Some(path) => read_prior(path, &config.sheet_name)?,
        None => None,
    };
    if let Some(prior) = &prior {
        sink.report(&format!("Prior output: {} rows", fmt_num(prior.len())));
    }

    let input_rows = input.frame.len();
    let merged = merge(prior, input.frame, index, &schema, config, sink);
    write_workbook(
        destination,
        &merged.frame,
        &config.sheet_name,
        config.column_padding,
    )?;

    let report = MergeReport {
        mode: config.mode,
        input_rows,
        skipped_rows: input.skipped,
        prior_rows: merged.prior_rows,
        enriched_rows: merged.enriched,
        lookup_misses: merged.misses,
        total_rows: merged.frame.len(),
        destination: destination.to_path_buf(),
        elapsed: start.elapsed(),
    };
    sink.report(&format!(
        "Saved {} rows to {}",
        fmt_num(report.total_rows),
        destination.display()
    ));
    Ok(report)
}
