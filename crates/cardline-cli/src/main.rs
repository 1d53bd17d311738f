//! cardline - enrich card inventory exports from the Scryfall bulk database
//!
//! Keeps a local mirror of the Scryfall "default cards" bulk file and
//! merges card metadata into ManaBox-style CSV or workbook exports.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use cardline_scryfall::Mirror;
use config::Config;

#[derive(Parser)]
#[command(name = "cardline")]
#[command(about = "Enrich card inventory exports from the Scryfall bulk database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./cardline.toml or ~/.config/cardline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the card database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read timeout in seconds for stall detection
    #[arg(long, global = true)]
    read_timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Enrich an inventory export and merge it into the output workbook
    Run(cmd::run::RunArgs),
    /// Download the card database if it is missing or outdated
    Sync(cmd::sync::SyncArgs),
    /// Show the local card database state
    Status(cmd::status::StatusArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(cardline_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug; progress bars show activity
    //   non-TTY: info unless --debug; logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    cardline_core::init_logging(quiet, cli.debug, multi).context("Failed to initialize logging")?;

    // Load configuration
    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // CLI overrides
    if let Some(dir) = cli.data_dir {
        config.mirror.data_dir = dir;
    }
    if let Some(secs) = cli.read_timeout {
        config.http.read_timeout = secs;
    }

    match cli.command {
        Command::Run(args) => cmd::run::run(args, &config, open_mirror(&config)?, &progress),
        Command::Sync(args) => cmd::sync::run(args, open_mirror(&config)?, &progress),
        Command::Status(args) => cmd::status::run(args, &open_mirror(&config)?),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Data directory",
                &config.mirror.data_dir.display().to_string(),
            ]);
            table.add_row(vec!["Listing URL", &config.mirror.listing_url]);
            table.add_row(vec!["Dataset", &config.mirror.dataset]);
            table.add_row(vec![
                "Timeouts",
                &format!(
                    "connect {}s, read {}s, listing {}s",
                    config.http.connect_timeout,
                    config.http.read_timeout,
                    config.http.request_timeout
                ),
            ]);
            table.add_row(vec!["Merge mode", config.enrich.mode.name()]);
            table.add_row(vec!["Schema", config.enrich.schema.name()]);
            table.add_row(vec!["Sheet name", &config.enrich.sheet_name]);
            table.add_row(vec![
                "Default output",
                &config.enrich.default_output.display().to_string(),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}

fn open_mirror(config: &Config) -> Result<Mirror> {
    let http = config.http_config();
    log::debug!(
        "HTTP: connect {:?}, read {:?}",
        http.connect_timeout,
        http.read_timeout
    );
    Mirror::new(config.mirror_config(), http).context("Failed to set up card database mirror")
}
