use reelfix_store::StoreError;
use thiserror::Error;

/// Faults that stop a whole batch run.
///
/// Per-record failures are logged and counted in the summary instead.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Store has no shards to reconcile")]
    NoShards,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Reconciliation task aborted: {0}")]
    Aborted(String),
}
