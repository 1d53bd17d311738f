//! Cardline Scryfall - local mirror of the Scryfall bulk card database
//!
//! This crate keeps a local copy of the "default cards" bulk file in sync
//! with the remote listing and loads it into an in-memory lookup index.
//!
//! # Example
//!
//! ```no_run
//! use cardline_core::{HttpConfig, LogSink};
//! use cardline_scryfall::{LookupIndex, Mirror, MirrorConfig};
//!
//! let mirror = Mirror::new(MirrorConfig::default(), HttpConfig::default()).unwrap();
//! mirror.ensure_fresh(false, &LogSink).expect("sync failed");
//!
//! let index = LookupIndex::build(&mirror.payload_path()).expect("index failed");
//! println!("{} cards", index.len());
//! ```

pub mod bulk;
pub mod card;
pub mod config;
pub mod index;
pub mod mirror;

// Re-exports for convenience
pub use bulk::{BulkEntry, BulkListing, Snapshot};
pub use card::{CardFace, CardRecord};
pub use config::MirrorConfig;
pub use index::LookupIndex;
pub use mirror::{Mirror, MirrorStatus, SyncOutcome};
