//! Batch reconciliation over every record in the store.
//!
//! Records are processed with bounded fan-out: each record runs in its own
//! tokio task and `buffer_unordered` caps how many are in flight. Shows fan
//! out again per episode. Cancellation is cooperative; workers check the
//! shared flag before each record, before each write and before each season
//! and episode, so a patch is either written whole or not at all.

use std::future::Future;
use std::sync::Arc;

use futures::future;
use futures::stream::{self, StreamExt};
use reelfix_core::{
    CanonicalRecord, Episode, IsEmpty, MediaIdentity, MediaType, RecordId, RecordRef, ResolveRequest,
    ShardId, StoredRecord,
};
use reelfix_provider::{IdentityResolver, MetadataProvider, ProviderKind, Resolved};
use reelfix_store::{EpisodePatch, RecordStore, StoreError};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::error::ReconcileError;
use crate::events::{ReconcileEvent, RecordOutcome};
use crate::merge;
use crate::progress::{JobState, ProgressSnapshot};

pub const DEFAULT_FAN_OUT: usize = 20;
pub const DEFAULT_PROGRESS_EVERY: u64 = 5;

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Records in flight at once
    pub fan_out: usize,
    /// Episodes in flight per show; `None` means `fan_out / 4`, at least 1
    pub episode_fan_out: Option<usize>,
    /// Emit a progress event every N finished records
    pub progress_every: u64,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            episode_fan_out: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl ReconcileOptions {
    pub fn episode_fan_out(&self) -> usize {
        self.episode_fan_out.unwrap_or(self.fan_out / 4).max(1)
    }
}

/// Totals for a finished (or cancelled) run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileSummary {
    pub total: u64,
    pub done: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub unresolved: u64,
    pub discarded: u64,
    pub errors: u64,
    pub episodes_updated: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed {
        done: u64,
        total: u64,
        elapsed: Duration,
    },
    Cancelled {
        done: u64,
        total: u64,
    },
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed {
                done,
                total,
                elapsed,
            } => write!(
                f,
                "Completed: {done}/{total} records in {:.1}s",
                elapsed.as_secs_f64()
            ),
            Self::Cancelled { done, total } => write!(f, "Cancelled: {done}/{total} records"),
        }
    }
}

impl ReconcileSummary {
    pub fn outcome(&self) -> JobOutcome {
        if self.cancelled {
            JobOutcome::Cancelled {
                done: self.done,
                total: self.total,
            }
        } else {
            JobOutcome::Completed {
                done: self.done,
                total: self.total,
                elapsed: self.elapsed,
            }
        }
    }

    fn add(&mut self, report: &RecordReport) {
        match &report.outcome {
            RecordOutcome::Updated(_) => self.updated += 1,
            RecordOutcome::Unchanged => self.unchanged += 1,
            RecordOutcome::Unresolved => self.unresolved += 1,
            RecordOutcome::Discarded => self.discarded += 1,
            RecordOutcome::Failed(_) => self.errors += 1,
        }
        self.episodes_updated += report.episodes_updated;
    }
}

/// Result of one record's worker. `None` from the worker means the record
/// was skipped because of cancellation and is not counted.
struct RecordReport {
    record: RecordRef,
    title: String,
    outcome: RecordOutcome,
    episodes_updated: u64,
}

impl RecordReport {
    /// A failure with no record attached (read error or panicked task).
    fn unreadable(shard: ShardId, collection: MediaType, error: String) -> Self {
        Self {
            record: RecordRef {
                shard,
                collection,
                id: RecordId(String::new()),
            },
            title: String::new(),
            outcome: RecordOutcome::Failed(error),
            episodes_updated: 0,
        }
    }
}

/// A configured batch run. Consumed by [`ReconcileJob::run`] or
/// [`start_reconciliation`].
pub struct ReconcileJob<S, A, B> {
    store: Arc<S>,
    resolver: Arc<IdentityResolver<A, B>>,
    options: ReconcileOptions,
    state: Arc<JobState>,
}

impl<S, A, B> ReconcileJob<S, A, B>
where
    S: RecordStore,
    A: MetadataProvider,
    B: MetadataProvider,
{
    pub fn new(store: Arc<S>, resolver: Arc<IdentityResolver<A, B>>) -> Self {
        Self {
            store,
            resolver,
            options: ReconcileOptions::default(),
            state: Arc::new(JobState::new()),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Share an externally created state, e.g. to cancel from elsewhere.
    pub fn with_state(mut self, state: Arc<JobState>) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> Arc<JobState> {
        self.state.clone()
    }

    /// Reconcile every record in every shard.
    ///
    /// Only store-level faults while counting are returned as errors;
    /// per-record problems are counted in the summary.
    pub async fn run(
        self,
        events: UnboundedSender<ReconcileEvent>,
    ) -> Result<ReconcileSummary, ReconcileError> {
        let shards = self.store.shard_count();
        if shards == 0 {
            return Err(ReconcileError::NoShards);
        }

        let mut total = 0;
        for shard in 1..=shards {
            for &collection in MediaType::all() {
                total += self.store.count(ShardId(shard), collection).await?;
            }
        }
        self.state.set_total(total);
        log::info!(
            "Reconciling {total} records across {shards} shards (fan-out {}, episode fan-out {})",
            self.options.fan_out,
            self.options.episode_fan_out()
        );
        let _ = events.send(ReconcileEvent::Started { total });

        let worker = Arc::new(Worker {
            store: self.store.clone(),
            resolver: self.resolver.clone(),
            state: self.state.clone(),
            episode_fan_out: self.options.episode_fan_out(),
        });
        let mut summary = ReconcileSummary {
            total,
            ..ReconcileSummary::default()
        };
        let every = self.options.progress_every.max(1);

        'shards: for shard in 1..=shards {
            for &collection in MediaType::all() {
                if self.state.is_cancelled() {
                    break 'shards;
                }
                let shard = ShardId(shard);
                log::debug!("Processing {shard}/{collection}");

                let pool_worker = worker.clone();
                let state = self.state.clone();
                let mut results = self
                    .store
                    .records(shard, collection)
                    .take_while(move |_| future::ready(!state.is_cancelled()))
                    .map(move |item| {
                        let worker = pool_worker.clone();
                        tokio::spawn(async move {
                            match item {
                                Ok(record) => worker.process(record).await,
                                Err(e) => Some(RecordReport::unreadable(
                                    shard,
                                    collection,
                                    format!("read failed: {e}"),
                                )),
                            }
                        })
                    })
                    .buffer_unordered(self.options.fan_out.max(1));

                while let Some(joined) = results.next().await {
                    let report = match joined {
                        Ok(Some(report)) => report,
                        Ok(None) => continue,
                        Err(join_err) => {
                            log::error!("Record task panicked: {join_err}");
                            RecordReport::unreadable(shard, collection, join_err.to_string())
                        }
                    };

                    let done = self.state.record_done();
                    summary.done = done;
                    summary.add(&report);
                    let _ = events.send(ReconcileEvent::RecordFinished {
                        id: report.record.id,
                        title: report.title,
                        outcome: report.outcome,
                        episodes_updated: report.episodes_updated,
                    });
                    if done % every == 0 || done == total {
                        let snap = self.state.snapshot();
                        log::debug!("Progress {}/{} eta {:?}", snap.done, snap.total, snap.eta_seconds());
                        let _ = events.send(ReconcileEvent::Progress(snap));
                    }
                }
            }
        }

        summary.cancelled = self.state.is_cancelled();
        summary.elapsed = self.state.elapsed();
        if summary.cancelled {
            let _ = events.send(ReconcileEvent::Cancelled {
                done: summary.done,
                total,
            });
        }
        log::info!(
            "{} ({} updated, {} unchanged, {} unresolved, {} errors, {} episodes)",
            summary.outcome(),
            summary.updated,
            summary.unchanged,
            summary.unresolved,
            summary.errors,
            summary.episodes_updated
        );
        let _ = events.send(ReconcileEvent::Done {
            summary: summary.clone(),
        });
        Ok(summary)
    }
}

/// Per-record work shared by all spawned tasks of a run.
struct Worker<S, A, B> {
    store: Arc<S>,
    resolver: Arc<IdentityResolver<A, B>>,
    state: Arc<JobState>,
    episode_fan_out: usize,
}

impl<S, A, B> Worker<S, A, B>
where
    S: RecordStore,
    A: MetadataProvider,
    B: MetadataProvider,
{
    async fn process(self: Arc<Self>, record: StoredRecord) -> Option<RecordReport> {
        if self.state.is_cancelled() {
            return None;
        }

        let target = record.record_ref();
        let title = record.title.clone();
        let report = |outcome, episodes_updated| RecordReport {
            record: target.clone(),
            title: title.clone(),
            outcome,
            episodes_updated,
        };

        let resolved = match self.resolve_candidates(&record).await {
            Ok(resolved) => resolved,
            Err(message) => {
                log::warn!("Skipping '{}' ({}): {message}", record.title, record.id);
                return Some(report(RecordOutcome::Failed(message), 0));
            }
        };
        if resolved.is_empty() {
            return Some(report(RecordOutcome::Unresolved, 0));
        }

        let candidates: Vec<CanonicalRecord> = resolved.iter().map(|r| r.record.clone()).collect();
        let patch = merge::reconcile(&record, &candidates);

        if self.state.is_cancelled() {
            log::debug!("Discarding patch for '{}' after cancellation", record.title);
            return Some(report(RecordOutcome::Discarded, 0));
        }

        let outcome = if patch.is_empty() {
            RecordOutcome::Unchanged
        } else {
            match write_with_retry(|| self.store.update_record(&target, &patch)).await {
                Ok(_) => RecordOutcome::Updated(patch.fields().collect()),
                Err(e) => {
                    log::error!("Failed to update '{}' ({}): {e}", record.title, record.id);
                    RecordOutcome::Failed(e.to_string())
                }
            }
        };

        let episodes_updated = if record.media_type == MediaType::Tv {
            self.clone().process_episodes(&record, Arc::new(resolved)).await
        } else {
            0
        };

        Some(report(outcome, episodes_updated))
    }

    /// Up to two resolution passes. The second pass runs when the first
    /// yields an id for the other provider that the record doesn't have yet.
    async fn resolve_candidates(&self, record: &StoredRecord) -> Result<Vec<Resolved>, String> {
        let identity = MediaIdentity::new(record.title.clone(), record.media_type)
            .map_err(|e| e.to_string())?
            .with_imdb_id(record.imdb_id.clone())
            .with_tmdb_id(record.tmdb_id)
            .with_year(record.year);

        let Some(first) = self.resolver.resolve(&ResolveRequest::new(identity.clone())).await else {
            return Ok(Vec::new());
        };

        let backfill = match first.provider {
            ProviderKind::Primary => first
                .record
                .tmdb_id
                .filter(|id| record.tmdb_id != Some(*id))
                .map(|id| backfill_identity(&identity).with_tmdb_id(Some(id))),
            ProviderKind::Secondary => first
                .record
                .imdb_id
                .clone()
                .filter(|id| record.imdb_id.as_ref() != Some(id))
                .map(|id| backfill_identity(&identity).with_imdb_id(Some(id))),
        };

        let mut passes = vec![first];
        if let Some(identity) = backfill {
            log::debug!("Backfill pass for '{}'", record.title);
            if let Some(second) = self.resolver.resolve(&ResolveRequest::new(identity)).await {
                passes.push(second);
            }
        }
        Ok(passes)
    }

    /// Resolve and write every incomplete episode of a show. Returns the
    /// number of episodes written.
    async fn process_episodes(self: Arc<Self>, show: &StoredRecord, resolved: Arc<Vec<Resolved>>) -> u64 {
        let target = show.record_ref();
        let mut updated = 0;

        for season in &show.seasons {
            if self.state.is_cancelled() {
                break;
            }
            let pending: Vec<Episode> = season
                .episodes
                .iter()
                .filter(|e| !e.is_complete())
                .cloned()
                .collect();
            if pending.is_empty() {
                continue;
            }
            let season_number = season.season_number;

            let results: Vec<bool> = stream::iter(pending)
                .map(|episode| {
                    let worker = self.clone();
                    let target = target.clone();
                    let resolved = resolved.clone();
                    async move {
                        worker
                            .process_episode(target, season_number, episode, resolved)
                            .await
                    }
                })
                .buffer_unordered(self.episode_fan_out)
                .collect()
                .await;
            updated += results.into_iter().filter(|&written| written).count() as u64;
        }

        updated
    }

    async fn process_episode(
        self: Arc<Self>,
        target: RecordRef,
        season: u32,
        episode: Episode,
        resolved: Arc<Vec<Resolved>>,
    ) -> bool {
        if self.state.is_cancelled() {
            return false;
        }
        let number = episode.episode_number;

        // One candidate per resolved pass, in pass order. Later passes are
        // only asked while some empty field is still unfilled.
        let mut candidates = Vec::new();
        let mut patch = EpisodePatch::default();
        for r in resolved.iter() {
            if self.state.is_cancelled() {
                return false;
            }
            if let Some(candidate) = self
                .resolver
                .episode_for(r.provider, &r.record, season, number)
                .await
            {
                candidates.push(candidate);
                patch = merge::reconcile_episode(&episode, &candidates);
                if fills_every_gap(&episode, &patch) {
                    break;
                }
            }
        }
        if candidates.is_empty() {
            log::debug!("No episode data for {} S{season}E{number}", target.id);
            return false;
        }
        if patch.is_empty() || self.state.is_cancelled() {
            return false;
        }

        match write_with_retry(|| self.store.update_episode(&target, season, number, &patch)).await {
            Ok(ack) => ack.modified,
            Err(e) => {
                log::warn!("Failed to update {} S{season}E{number}: {e}", target.id);
                false
            }
        }
    }
}

/// True when `patch` leaves none of the episode's empty fields empty.
fn fills_every_gap(episode: &Episode, patch: &EpisodePatch) -> bool {
    (!episode.overview.is_empty_value() || patch.overview.is_some())
        && (!episode.released_at.is_empty_value() || patch.released_at.is_some())
        && (!episode.episode_backdrop.is_empty_value() || patch.backdrop.is_some())
}

/// Identity for a backfill pass: same title and year, no ids.
fn backfill_identity(identity: &MediaIdentity) -> MediaIdentity {
    MediaIdentity {
        imdb_id: None,
        tmdb_id: None,
        ..identity.clone()
    }
}

/// Run a store write, retrying once on failure.
async fn write_with_retry<T, F, Fut>(mut write: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    match write().await {
        Ok(v) => Ok(v),
        Err(e) => {
            log::warn!("Store write failed, retrying once: {e}");
            write().await
        }
    }
}

/// A running job.
pub struct JobHandle {
    state: Arc<JobState>,
    events: Option<mpsc::UnboundedReceiver<ReconcileEvent>>,
    task: JoinHandle<Result<ReconcileSummary, ReconcileError>>,
}

impl JobHandle {
    /// Request cooperative cancellation. In-flight writes finish; no new
    /// records start.
    pub fn cancel(&self) {
        self.state.request_cancel();
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> Arc<JobState> {
        self.state.clone()
    }

    /// Take the event stream. Returns `None` if already taken.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ReconcileEvent>> {
        self.events.take()
    }

    pub async fn wait(self) -> Result<ReconcileSummary, ReconcileError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ReconcileError::Aborted(e.to_string())),
        }
    }
}

/// Spawn `job` on the current runtime and return a handle to it.
pub fn start_reconciliation<S, A, B>(job: ReconcileJob<S, A, B>) -> JobHandle
where
    S: RecordStore,
    A: MetadataProvider,
    B: MetadataProvider,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let state = job.state();
    let task = tokio::spawn(job.run(tx));
    JobHandle {
        state,
        events: Some(rx),
        task,
    }
}
