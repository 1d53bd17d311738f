//! `cardline run` - enrich an inventory export

use std::path::PathBuf;

use anyhow::Result;
use cardline_core::{SharedProgress, fmt_num};
use cardline_enrich::{MergeMode, RunConfig, SchemaVersion, SyncPolicy};
use cardline_scryfall::{Mirror, SyncOutcome};
use clap::Args;
use indicatif::HumanBytes;

use super::{in_background, print_failure, print_summary};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Inventory export (CSV, or an .xlsx/.xls/.ods workbook)
    pub input: PathBuf,

    /// Output workbook
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Previous output to merge with (default: the output path, if it exists)
    #[arg(long)]
    pub prior: Option<PathBuf>,

    /// incremental: enrich only new IDs; full: re-enrich everything
    #[arg(long)]
    pub mode: Option<MergeMode>,

    /// Output schema: v1 (no power/toughness) or v2
    #[arg(long)]
    pub schema: Option<SchemaVersion>,

    /// Use the local card database without checking for updates
    #[arg(long)]
    pub no_sync: bool,

    /// Re-download the card database even if it is up-to-date
    #[arg(long, conflicts_with = "no_sync")]
    pub force_sync: bool,
}

impl RunArgs {
    fn run_config(self, config: &Config) -> RunConfig {
        let mut enrich = config.enrich_config();
        if let Some(mode) = self.mode {
            enrich.mode = mode;
        }
        if let Some(schema) = self.schema {
            enrich.schema = schema;
        }
        let sync = if self.no_sync {
            SyncPolicy::Skip
        } else if self.force_sync {
            SyncPolicy::Force
        } else {
            SyncPolicy::IfStale
        };
        RunConfig {
            prior: self.prior,
            sync,
            enrich,
            ..RunConfig::new(
                self.input,
                self.output
                    .unwrap_or_else(|| config.enrich.default_output.clone()),
            )
        }
    }
}

pub fn run(args: RunArgs, config: &Config, mirror: Mirror, progress: &SharedProgress) -> Result<()> {
    let run_config = args.run_config(config);
    log::debug!("Run config: {run_config:?}");

    let report = in_background(progress, "cardline-run", move |sink| {
        cardline_enrich::run(&run_config, &mirror, sink)
    })?
    .inspect_err(|e| print_failure("Run failed", e))?;

    let sync = match &report.sync {
        None => "skipped".to_string(),
        Some(SyncOutcome::UpToDate) => "up-to-date".to_string(),
        Some(SyncOutcome::Downloaded { bytes }) => format!("downloaded {}", HumanBytes(*bytes)),
    };
    let merge = &report.merge;
    print_summary(
        "Run",
        &[
            ("Card database", sync),
            ("Cards indexed", fmt_num(report.cards_indexed)),
            ("Mode", merge.mode.to_string()),
            (
                "Input rows",
                format!(
                    "{} ({} skipped)",
                    fmt_num(merge.input_rows),
                    fmt_num(merge.skipped_rows)
                ),
            ),
            ("Prior rows", fmt_num(merge.prior_rows)),
            ("Enriched", fmt_num(merge.enriched_rows)),
            ("Not found", fmt_num(merge.lookup_misses)),
            ("Rows written", fmt_num(merge.total_rows)),
            ("Output", merge.destination.display().to_string()),
            ("Time", format!("{:.1}s", report.elapsed.as_secs_f64())),
        ],
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> RunArgs {
        TestCli::try_parse_from(std::iter::once("run").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn defaults_come_from_config() {
        let config = Config::default();
        let run = parse(&["export.csv"]).run_config(&config);
        assert_eq!(run.output, PathBuf::from("mtg_collection_enriched.xlsx"));
        assert_eq!(run.sync, SyncPolicy::IfStale);
        assert_eq!(run.enrich.mode, MergeMode::Incremental);
        assert_eq!(run.enrich.schema, SchemaVersion::V2);
        assert!(run.prior.is_none());
    }

    #[test]
    fn flags_override_config() {
        let config = Config::default();
        let run = parse(&[
            "export.csv",
            "-o",
            "out.xlsx",
            "--mode",
            "full",
            "--schema",
            "v1",
            "--no-sync",
            "--prior",
            "old.xlsx",
        ])
        .run_config(&config);
        assert_eq!(run.output, PathBuf::from("out.xlsx"));
        assert_eq!(run.prior, Some(PathBuf::from("old.xlsx")));
        assert_eq!(run.enrich.mode, MergeMode::Full);
        assert_eq!(run.enrich.schema, SchemaVersion::V1);
        assert_eq!(run.sync, SyncPolicy::Skip);
    }

    #[test]
    fn force_sync() {
        let run = parse(&["export.csv", "--force-sync"]).run_config(&Config::default());
        assert_eq!(run.sync, SyncPolicy::Force);
        assert!(TestCli::try_parse_from(["run", "x.csv", "--no-sync", "--force-sync"]).is_err());
    }

    #[test]
    fn bad_mode_is_rejected() {
        assert!(TestCli::try_parse_from(["run", "x.csv", "--mode", "append"]).is_err());
    }
}
