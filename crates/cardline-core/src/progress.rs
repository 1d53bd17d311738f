//! Progress reporting for TTY and non-TTY environments.
//!
//! The pipeline only sees [`ProgressSink`]. The CLI plugs in [`BarSink`]
//! (indicatif bar on a TTY, log lines otherwise); library callers and tests
//! can use [`LogSink`] or their own implementation.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{HumanBytes, HumanDuration, MultiProgress, ProgressBar, ProgressStyle};

/// Receiver of status text and numeric progress from a running pipeline.
///
/// Called from the background task; implementations must not block on
/// the caller. Notifications are fire-and-forget.
pub trait ProgressSink: Send + Sync {
    /// Human-readable status line
    fn report(&self, message: &str);

    /// Cumulative progress of the current phase. `total == 0` means unknown.
    fn report_progress(&self, done: u64, total: u64);

    /// A new phase starts; subsequent progress counts restart from zero.
    fn begin_phase(&self, _phase: Phase) {}
}

/// Pipeline phase, used to pick progress units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Bulk payload download (bytes)
    Download,
    /// Row enrichment (rows)
    Enrich,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Enrich => "enrich",
        }
    }
}

/// Sink that forwards everything to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, message: &str) {
        log::info!("{message}");
    }

    fn report_progress(&self, done: u64, total: u64) {
        log::trace!("progress {done}/{total}");
    }

    fn begin_phase(&self, phase: Phase) {
        log::debug!("phase: {}", phase.label());
    }
}

/// Download bar (uv-style: green bar, binary bytes)
fn bytes_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:<10.dim} {bar:30.green/dim} {binary_bytes:>9}/{binary_total_bytes:9} {eta:>4}")
        .expect("invalid template")
        .progress_chars("--")
}

/// Row counter bar
fn rows_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:<10.dim} {bar:30.cyan/dim} {pos:>7}/{len:7} rows {wide_msg:.dim}")
        .expect("invalid template")
        .progress_chars("--")
}

/// Central progress context managing multi-progress bars.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        Self::with_tty(std::io::stderr().is_terminal())
    }

    /// Create context with explicit TTY mode (non-TTY hides all bars).
    pub fn with_tty(is_tty: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Create a progress bar managed by this context.
    ///
    /// TTY: visible bar, style set per phase by [`BarSink`].
    /// Non-TTY: hidden (no-op).
    pub fn bar(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(0));
        pb.set_style(rows_style());
        pb.set_prefix(name.to_string());
        pb
    }

    /// Print a line above managed progress bars (avoids interference).
    ///
    /// Use this instead of `eprintln!` when progress bars are active.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Whether running in TTY mode.
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for `ProgressContext`.
pub type SharedProgress = Arc<ProgressContext>;

/// Sink rendering progress on an indicatif bar.
///
/// Status lines print above the bar on a TTY and go to `log` otherwise,
/// where they are the only progress indicator.
pub struct BarSink {
    progress: SharedProgress,
    bar: ProgressBar,
}

impl BarSink {
    pub fn new(progress: SharedProgress) -> Self {
        let bar = progress.bar("cardline");
        Self { progress, bar }
    }

    /// Remove the bar once the run is over.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarSink {
    fn report(&self, message: &str) {
        if self.progress.is_tty() {
            self.progress.println(message);
        } else {
            log::info!("{message}");
        }
    }

    fn report_progress(&self, done: u64, total: u64) {
        if total > 0 && self.bar.length() != Some(total) {
            self.bar.set_length(total);
        }
        self.bar.set_position(done);
    }

    fn begin_phase(&self, phase: Phase) {
        self.bar.reset();
        self.bar.set_length(0);
        self.bar.set_style(match phase {
            Phase::Download => bytes_style(),
            Phase::Enrich => rows_style(),
        });
        self.bar.set_prefix(phase.label());
    }
}

/// Periodic throughput / time-remaining messages for long downloads.
///
/// [`poll`](EtaReporter::poll) yields a message at most once per `interval`.
#[derive(Debug)]
pub struct EtaReporter {
    started: Instant,
    last: Instant,
    interval: Duration,
}

impl EtaReporter {
    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            started: start,
            last: start,
            interval,
        }
    }

    /// Message for the current state if `interval` has passed since the last one.
    pub fn poll(&mut self, now: Instant, done: u64, total: Option<u64>) -> Option<String> {
        if now.saturating_duration_since(self.last) < self.interval {
            return None;
        }
        self.last = now;
        let elapsed = now.saturating_duration_since(self.started);
        let rate = throughput(done, elapsed)?;
        let line = match total.filter(|&t| t >= done && t > 0) {
            Some(total) => {
                let remaining = estimate_remaining(done, total, elapsed)?;
                format!(
                    "{} / {} ({}/s), ~{} remaining",
                    HumanBytes(done),
                    HumanBytes(total),
                    HumanBytes(rate as u64),
                    HumanDuration(remaining)
                )
            }
            None => format!(
                "{} downloaded ({}/s)",
                HumanBytes(done),
                HumanBytes(rate as u64)
            ),
        };
        Some(line)
    }
}

/// Observed bytes per second, `None` before any data or time has passed
pub fn throughput(done: u64, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    if done == 0 || secs <= 0.0 {
        return None;
    }
    Some(done as f64 / secs)
}

/// Time left at the observed throughput
pub fn estimate_remaining(done: u64, total: u64, elapsed: Duration) -> Option<Duration> {
    let rate = throughput(done, elapsed)?;
    let left = total.saturating_sub(done) as f64;
    Some(Duration::from_secs_f64(left / rate))
}

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_num_small() {
        assert_eq!(fmt_num(0), "0");
        assert_eq!(fmt_num(123), "123");
    }

    #[test]
    fn fmt_num_thousands() {
        assert_eq!(fmt_num(1_000), "1,000");
        assert_eq!(fmt_num(123_456), "123,456");
        assert_eq!(fmt_num(1_234_567), "1,234,567");
    }

    #[test]
    fn estimate_remaining_linear() {
        // 40 of 100 bytes in 4s -> 10 B/s -> 6s left
        let left = estimate_remaining(40, 100, Duration::from_secs(4)).unwrap();
        assert_eq!(left, Duration::from_secs(6));
    }

    #[test]
    fn estimate_remaining_needs_data() {
        assert!(estimate_remaining(0, 100, Duration::from_secs(4)).is_none());
        assert!(estimate_remaining(10, 100, Duration::ZERO).is_none());
    }

    #[test]
    fn eta_reporter_respects_interval() {
        let start = Instant::now();
        let mut eta = EtaReporter::starting_at(start, Duration::from_secs(5));

        assert!(eta.poll(start + Duration::from_secs(2), 1_000, Some(10_000)).is_none());

        let msg = eta
            .poll(start + Duration::from_secs(5), 5_000, Some(10_000))
            .unwrap();
        assert!(msg.contains("remaining"), "{msg}");

        // Next message only after another full interval
        assert!(eta.poll(start + Duration::from_secs(8), 8_000, Some(10_000)).is_none());
        assert!(eta.poll(start + Duration::from_secs(10), 9_000, Some(10_000)).is_some());
    }

    #[test]
    fn eta_reporter_unknown_total() {
        let start = Instant::now();
        let mut eta = EtaReporter::starting_at(start, Duration::from_secs(5));
        let msg = eta.poll(start + Duration::from_secs(6), 6_000, None).unwrap();
        assert!(msg.contains("downloaded"), "{msg}");
        assert!(!msg.contains("remaining"));
    }

    #[test]
    fn bar_sink_hidden_when_not_tty() {
        let sink = BarSink::new(Arc::new(ProgressContext::with_tty(false)));
        sink.begin_phase(Phase::Download);
        sink.report_progress(50, 100);
        sink.report("status line");
        sink.finish();
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::Download.label(), "download");
        assert_eq!(Phase::Enrich.label(), "enrich");
    }
}
