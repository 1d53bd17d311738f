//! Single in-flight background task
//!
//! The sync-then-enrich sequence runs off the interactive thread, one run
//! at a time. [`TaskSlot`] refuses a second start while a task is active and
//! frees itself when the task ends, including by panic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("a run is already in progress")]
    Busy,
    #[error("cannot start background task: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Guard that clears the busy flag when the task thread finishes
struct Release(Arc<AtomicBool>);

impl Drop for Release {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Slot admitting at most one background task at a time
#[derive(Debug, Clone, Default)]
pub struct TaskSlot {
    busy: Arc<AtomicBool>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a task currently occupies the slot
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run `f` on a named background thread if the slot is free.
    pub fn try_spawn<T, F>(&self, name: &str, f: F) -> Result<TaskHandle<T>, TaskError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TaskError::Busy);
        }

        let release = Release(Arc::clone(&self.busy));
        let spawned = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _release = release;
                f()
            });
        match spawned {
            Ok(inner) => Ok(TaskHandle { inner }),
            Err(e) => {
                // Closure (and its guard) was dropped unrun, so the slot is free again
                Err(TaskError::Spawn(e))
            }
        }
    }
}

/// Handle to a running background task
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task. `Err` carries the panic payload.
    pub fn join(self) -> std::thread::Result<T> {
        self.inner.join()
    }
}
