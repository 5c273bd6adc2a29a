//! Fill-only reconciliation of stored records against metadata providers.

pub mod error;
pub mod events;
pub mod job;
pub mod merge;
pub mod progress;

pub use error::ReconcileError;
pub use events::{ReconcileEvent, RecordOutcome, log_event, run_with_events};
pub use job::{
    JobHandle, JobOutcome, ReconcileJob, ReconcileOptions, ReconcileSummary, start_reconciliation,
};
pub use merge::{reconcile, reconcile_episode};
pub use progress::{JobState, ProgressSnapshot, estimate_remaining, format_eta};
