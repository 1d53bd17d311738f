pub mod run;
pub mod status;
pub mod sync;

use std::sync::{Arc, LazyLock};

use anyhow::{Result, anyhow};
use cardline_core::{BarSink, Error, ProgressSink, SharedProgress, TaskSlot};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

/// One sync/enrich task per process
static TASK_SLOT: LazyLock<TaskSlot> = LazyLock::new(TaskSlot::new);

/// Run `f` on the background task slot with a bar sink, and wait for it.
pub fn in_background<T, F>(progress: &SharedProgress, name: &str, f: F) -> Result<T>
where
    F: FnOnce(&dyn ProgressSink) -> T + Send + 'static,
    T: Send + 'static,
{
    let sink = Arc::new(BarSink::new(Arc::clone(progress)));
    let task_sink = Arc::clone(&sink);
    let handle = TASK_SLOT.try_spawn(name, move || f(task_sink.as_ref()))?;
    let result = handle
        .join()
        .map_err(|_| anyhow!("{name} task panicked"));
    sink.finish();
    result
}

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Rows describing a failed sync or run
fn failure_rows(err: &Error) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Error", err.kind().to_string()), ("Detail", err.to_string())];
    if err.needs_resync() {
        rows.push(("Next step", "cardline sync --force".to_string()));
    }
    rows
}

/// Print a failure summary table on stderr
pub fn print_failure(title: &str, err: &Error) {
    print_summary(title, &failure_rows(err));
}
