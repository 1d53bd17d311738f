//! `cardline sync` - bring the card database up to date

use anyhow::Result;
use cardline_core::SharedProgress;
use cardline_scryfall::{Mirror, SyncOutcome};
use clap::Args;
use indicatif::HumanBytes;

use super::{in_background, print_failure, print_summary};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Download even if the local copy matches the remote snapshot
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: SyncArgs, mirror: Mirror, progress: &SharedProgress) -> Result<()> {
    let force = args.force;
    let (outcome, mirror) = in_background(progress, "cardline-sync", move |sink| {
        let outcome = mirror
            .ensure_fresh(force, sink)
            .inspect_err(|e| sink.report(&format!("Error: {e}")));
        (outcome, mirror)
    })?;
    let outcome = outcome.inspect_err(|e| print_failure("Sync failed", e))?;

    let status = mirror.status();
    print_summary(
        "Sync",
        &[
            (
                "Result",
                match outcome {
                    SyncOutcome::UpToDate => "up-to-date".to_string(),
                    SyncOutcome::Downloaded { bytes } => {
                        format!("downloaded {}", HumanBytes(bytes))
                    }
                },
            ),
            ("Snapshot", status.marker.unwrap_or_else(|| "-".to_string())),
            ("Location", status.payload_path.display().to_string()),
        ],
    );
    Ok(())
}
