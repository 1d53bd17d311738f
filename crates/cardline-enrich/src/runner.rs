//! End-to-end enrichment run: sync → index → enrich → merge → write

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cardline_core::{ProgressSink, Result, fmt_num};
use cardline_scryfall::{LookupIndex, Mirror, SyncOutcome};

use crate::config::EnrichConfig;
use crate::input::load_input;
use crate::merge::{MergeReport, merge_and_write};
use crate::schema::Schema;

/// Whether to contact the card service before enriching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Use the local mirror as is
    Skip,
    /// Download only when the marker differs from the remote snapshot
    #[default]
    IfStale,
    /// Always download
    Force,
}

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Prior output to merge with; defaults to `output`
    pub prior: Option<PathBuf>,
    pub sync: SyncPolicy,
    pub enrich: EnrichConfig,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            prior: None,
            sync: SyncPolicy::default(),
            enrich: EnrichConfig::default(),
        }
    }

    pub fn prior_path(&self) -> &Path {
        self.prior.as_deref().unwrap_or(&self.output)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// `None` when sync was skipped
    pub sync: Option<SyncOutcome>,
    pub cards_indexed: usize,
    pub merge: MergeReport,
    pub elapsed: Duration,
}

/// Execute one run. Errors are reported to `sink` before being returned.
pub fn run(config: &RunConfig, mirror: &Mirror, sink: &dyn ProgressSink) -> Result<RunReport> {
    execute(config, mirror, sink).inspect_err(|e| sink.report(&format!("Error: {e}")))
}

fn execute(config: &RunConfig, mirror: &Mirror, sink: &dyn ProgressSink) -> Result<RunReport> {
    let start = Instant::now();
    let schema = Schema::new(config.enrich.schema);

    // Validate before touching the network so a bad file fails fast
    let input = load_input(&config.input, &schema)?;
    sink.report(&format!(
        "{} rows loaded from {}",
        fmt_num(input.frame.len()),
        config.input.display()
    ));

    let sync = match config.sync {
        SyncPolicy::Skip => {
            log::info!("Skipping card database sync");
            None
        }
        SyncPolicy::IfStale => Some(mirror.ensure_fresh(false, sink)?),
        SyncPolicy::Force => Some(mirror.ensure_fresh(true, sink)?),
    };

    sink.report("Loading card database...");
    let index = LookupIndex::build(&mirror.payload_path())?;
    if index.is_empty() {
        log::warn!("Card database is empty; every row will be blank");
    }
    let cards_indexed = index.len();

    let merge = merge_and_write(
        Some(config.prior_path()),
        input,
        &index,
        &config.output,
        &config.enrich,
        sink,
    )?;
    merge.log();

    Ok(RunReport {
        sync,
        cards_indexed,
        merge,
        elapsed: start.elapsed(),
    })
}
