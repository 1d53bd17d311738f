//! Cardline Core - Common infrastructure for the card enrichment pipeline
//!
//! This crate provides the plumbing shared by the mirror, enrichment,
//! and CLI crates: HTTP streaming, the error taxonomy, progress sinks,
//! logging, atomic file writes, and the single background task slot.

pub mod atomic;
pub mod error;
pub mod logging;
pub mod progress;
pub mod stream;
pub mod task;

// Re-exports for convenience
pub use atomic::{commit, remove_stale_tmp, tmp_path, write_atomic};
pub use error::{Error, Result};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{
    BarSink, EtaReporter, LogSink, Phase, ProgressContext, ProgressSink, SharedProgress, fmt_num,
};
pub use stream::{HttpConfig, SHARED_RUNTIME, StreamError, build_client, download_to_file, get_text};
pub use task::{TaskError, TaskHandle, TaskSlot};
