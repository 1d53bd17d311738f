//! Cardline Enrich - inventory enrichment and merge
//!
//! Reads an inventory export (CSV or workbook), projects card metadata
//! from a [`LookupIndex`](cardline_scryfall::LookupIndex) onto each row,
//! merges the result with any previous output, and writes a single-sheet
//! workbook in canonical column order.

pub mod config;
pub mod enrich;
pub mod frame;
pub mod input;
pub mod merge;
pub mod runner;
pub mod schema;
pub mod xlsx;

// Re-exports for convenience
pub use config::EnrichConfig;
pub use enrich::{Enricher, Enrichment, color_names, split_type_line};
pub use frame::{Cell, Frame};
pub use input::{InputTable, load_input};
pub use merge::{MergeMode, MergeReport, merge, merge_and_write};
pub use runner::{RunConfig, RunReport, SyncPolicy, run};
pub use schema::{Field, KEY_COLUMN, SHEET_NAME, Schema, SchemaVersion};
