use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use reelfix_provider::Config;
use reelfix_reconcile::{
    JobOutcome, ReconcileEvent, ReconcileJob, ReconcileOptions, RecordOutcome, format_eta,
    run_with_events, start_reconciliation,
};
use reelfix_store::SqliteStore;

use crate::CliError;
use crate::cli_types::LimitArgs;

fn apply_limits(config: &mut Config, args: &LimitArgs) {
    if let Some(n) = args.concurrency {
        config.limits.provider_concurrency = n;
    }
    if let Some(n) = args.fan_out {
        config.limits.fan_out = n;
    }
    if args.episode_fan_out.is_some() {
        config.limits.episode_fan_out = args.episode_fan_out;
    }
}

/// Reconcile every record in the database.
pub(crate) fn run_fix(
    config_path: Option<&Path>,
    db: Option<PathBuf>,
    shards: Option<u32>,
    limits: LimitArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let mut config = super::load_config(config_path)?;
    apply_limits(&mut config, &limits);

    let db_path = super::db_path(db, &config);
    if !db_path.exists() {
        log::warn!("No record database found at {}", db_path.display());
        log::info!("Run 'reelfix import <file>' to create one.");
        return Ok(());
    }

    let store = SqliteStore::open(&db_path, shards)
        .map_err(|e| CliError::database(format!("Failed to open record database: {e}")))?;
    let resolver = reelfix_provider::connect(&config).map_err(|e| CliError::config(e.to_string()))?;

    let options = ReconcileOptions {
        fan_out: config.limits.fan_out,
        episode_fan_out: config.limits.episode_fan_out,
        ..ReconcileOptions::default()
    };

    log::info!(
        "{} {}",
        "Reconciling".if_supports_color(Stdout, |t| t.bold()),
        db_path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "  {} requests in flight, {} records at a time",
        config.limits.provider_concurrency,
        options.fan_out,
    );
    crate::log_blank();

    let rt = crate::runtime()?;
    let summary = rt.block_on(async {
        let job = ReconcileJob::new(Arc::new(store), Arc::new(resolver)).with_options(options);
        let mut handle = start_reconciliation(job);
        let events = handle
            .take_events()
            .ok_or_else(|| CliError::runtime("event stream unavailable"))?;

        let state = handle.state();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted, finishing in-flight records...");
                state.request_cancel();
            }
        });

        let pb = progress_bar(quiet);
        let result = run_with_events(handle.wait(), events, |event| match event {
            ReconcileEvent::Started { total } => pb.set_length(total),
            ReconcileEvent::RecordFinished {
                id, title, outcome, ..
            } => {
                pb.inc(1);
                if let RecordOutcome::Failed(reason) = outcome {
                    pb.suspend(|| {
                        log::warn!(
                            "  {} {} ({}): {}",
                            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                            title,
                            id,
                            reason,
                        )
                    });
                }
            }
            ReconcileEvent::Progress(snap) => {
                if let Some(eta) = snap.eta {
                    pb.set_message(format!("ETA {}", format_eta(eta)));
                }
            }
            ReconcileEvent::Cancelled { .. } | ReconcileEvent::Done { .. } => {}
        })
        .await;

        pb.finish_and_clear();
        interrupt.abort();
        result.map_err(|e| CliError::runtime(e.to_string()))
    })?;

    match summary.outcome() {
        outcome @ JobOutcome::Completed { .. } => log::info!(
            "{} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            outcome,
        ),
        outcome @ JobOutcome::Cancelled { .. } => log::warn!(
            "{} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            outcome,
        ),
    }
    log::info!("  Updated:     {:>8}", summary.updated);
    log::info!("  Unchanged:   {:>8}", summary.unchanged);
    log::info!("  Unresolved:  {:>8}", summary.unresolved);
    log::info!("  Episodes:    {:>8}", summary.episodes_updated);
    if summary.discarded > 0 {
        log::info!("  Discarded:   {:>8}", summary.discarded);
    }
    if summary.errors > 0 {
        log::warn!(
            "  {} {} errors",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            summary.errors,
        );
    }

    Ok(())
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len} {percent}% {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
