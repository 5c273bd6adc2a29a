//! Progress events and a helper for draining them while a run executes.

use std::future::Future;

use reelfix_core::RecordId;
use reelfix_store::Field;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::job::ReconcileSummary;
use crate::progress::{ProgressSnapshot, format_eta};

/// Maximum time to drain remaining events after the run completes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Patch written with these fields
    Updated(Vec<Field>),
    /// Resolved, but nothing was missing
    Unchanged,
    /// Neither provider knew the item
    Unresolved,
    /// Cancellation arrived before the write; the patch was dropped
    Discarded,
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum ReconcileEvent {
    Started {
        total: u64,
    },
    Progress(ProgressSnapshot),
    RecordFinished {
        id: RecordId,
        title: String,
        outcome: RecordOutcome,
        episodes_updated: u64,
    },
    Cancelled {
        done: u64,
        total: u64,
    },
    Done {
        summary: ReconcileSummary,
    },
}

/// Log an event at a level matching its importance. Used when no
/// interactive progress display is attached.
pub fn log_event(event: &ReconcileEvent) {
    match event {
        ReconcileEvent::Started { total } => log::info!("Reconciling {total} records"),
        ReconcileEvent::Progress(snap) => log::info!(
            "  [{}/{}] {:.1}%{}",
            snap.done,
            snap.total,
            snap.percent(),
            snap.eta
                .map(|eta| format!(", ETA {}", format_eta(eta)))
                .unwrap_or_default()
        ),
        ReconcileEvent::RecordFinished {
            id, title, outcome, ..
        } => match outcome {
            RecordOutcome::Failed(error) => log::warn!("'{title}' ({id}) failed: {error}"),
            RecordOutcome::Unresolved => log::debug!("'{title}' ({id}) unresolved"),
            other => log::debug!("'{title}' ({id}): {other:?}"),
        },
        ReconcileEvent::Cancelled { done, total } => {
            log::warn!("Cancelled after {done} of {total} records")
        }
        ReconcileEvent::Done { summary } => log::info!("{}", summary.outcome()),
    }
}

/// Drive `task` to completion while passing each event from `event_rx` to
/// `on_event`. Returns the task's result after the channel is drained, or
/// after a timeout if senders outlive the task.
pub async fn run_with_events<F, E, R>(
    task: F,
    mut event_rx: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut result = None;

    loop {
        tokio::select! {
            r = &mut task, if result.is_none() => {
                result = Some(r);
                break;
            }
            event = event_rx.recv() => {
                match event {
                    Some(e) => on_event(e),
                    None => break,
                }
            }
        }
    }

    if result.is_some() {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        loop {
            match tokio::time::timeout_at(deadline, event_rx.recv()).await {
                Ok(Some(e)) => on_event(e),
                Ok(None) => break,
                Err(_) => {
                    log::warn!(
                        "Event drain timed out after {}s, senders likely leaked",
                        DRAIN_TIMEOUT.as_secs()
                    );
                    break;
                }
            }
        }
    }

    match result {
        Some(r) => r,
        None => task.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn all_events_are_seen_before_result() {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = async move {
            for i in 0..10 {
                tx.send(i).unwrap();
                tokio::task::yield_now().await;
            }
            "done"
        };
        let mut seen = Vec::new();
        let result = run_with_events(task, rx, |e| seen.push(e)).await;
        assert_eq!(result, "done");
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn closed_channel_still_returns_result() {
        let (tx, rx) = mpsc::unbounded_channel::<u32>();
        drop(tx);
        let result = run_with_events(async { 7 }, rx, |_| {}).await;
        assert_eq!(result, 7);
    }
}
