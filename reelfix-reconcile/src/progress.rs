//! Shared job counters and progress snapshots.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::time::{Duration, Instant};

/// Live state of a batch run, shared between the driver, its workers and
/// the job handle.
#[derive(Debug)]
pub struct JobState {
    total: AtomicU64,
    done: AtomicU64,
    started_at: Mutex<Instant>,
    cancel_requested: AtomicBool,
}

impl Default for JobState {
    fn default() -> Self {
        Self::new()
    }
}

impl JobState {
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            done: AtomicU64::new(0),
            started_at: Mutex::new(Instant::now()),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Record the run size. Elapsed time is measured from this call.
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
        *self.started_at() = Instant::now();
    }

    fn started_at(&self) -> std::sync::MutexGuard<'_, Instant> {
        match self.started_at.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Count one finished record and return the new `done` value.
    pub fn record_done(&self) -> u64 {
        self.done.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Ask workers to stop at their next checkpoint.
    pub fn request_cancel(&self) {
        if !self.cancel_requested.swap(true, Ordering::SeqCst) {
            log::info!("Cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at().elapsed()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(
            self.done.load(Ordering::SeqCst),
            self.total.load(Ordering::SeqCst),
            self.elapsed(),
        )
    }
}

/// Point-in-time view of a run's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub done: u64,
    pub total: u64,
    pub elapsed: Duration,
    /// `None` until at least one record has finished
    pub eta: Option<Duration>,
}

impl ProgressSnapshot {
    pub fn new(done: u64, total: u64, elapsed: Duration) -> Self {
        Self {
            done,
            total,
            elapsed,
            eta: estimate_remaining(elapsed, done, total),
        }
    }

    pub fn eta_seconds(&self) -> Option<u64> {
        self.eta.map(|d| d.as_secs())
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f64 * 100.0 / self.total as f64
        }
    }
}

/// `elapsed / done * (total - done)`.
pub fn estimate_remaining(elapsed: Duration, done: u64, total: u64) -> Option<Duration> {
    if done == 0 {
        return None;
    }
    let remaining = total.saturating_sub(done);
    Some(elapsed.mul_f64(remaining as f64 / done as f64))
}

/// Render a duration as `1h02m03s`, `2m05s` or `42s`.
pub fn format_eta(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h{m:02}m{s:02}s")
    } else if m > 0 {
        format!("{m}m{s:02}s")
    } else {
        format!("{s}s")
    }
}
