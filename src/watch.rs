//! The poll loop: fetch, merge, select the delta, report it and advance the watermark.

use crate::{
    commit::Commit,
    fetch::{FetchError, FetchResult, HistoryFetcher},
    history::{merge_histories, select_delta, MissingWatermark},
    report::Reporter,
    store::{StoreError, WatermarkStore},
};
use futures::{stream, StreamExt, TryStreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors that end a polling cycle.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The branch list or a branch history could not be fetched. The cycle is abandoned and
    /// retried after the next interval.
    #[error("failed to fetch commit information: {0}")]
    Transport(#[from] FetchError),

    /// The watermark could not be read or written. Polling must stop.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WatchError {
    /// Returns `true` if polling may continue with the next cycle.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, WatchError::Transport(_))
    }
}

/// Whether the watcher has completed a cycle yet.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    /// No cycle has completed in this process.
    Bootstrapping,
    /// At least one cycle has completed.
    Steady,
}

/// Tunables of the poll loop.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    /// Time slept between two cycles.
    pub interval: Duration,
    /// Maximum number of fetches in flight at once.
    pub concurrency: usize,
    /// Policy when the watermark is absent from the fetched history.
    pub missing_watermark: MissingWatermark,
}

/// Summary of one completed cycle.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct CycleOutcome {
    /// Whether the cycle recorded the visible history as already seen.
    pub bootstrapped: bool,
    /// The `(sha, branch)` pairs reported, in reporting order.
    pub reported: Vec<(String, String)>,
    /// Commits that qualified but whose details could not be fetched.
    pub skipped: usize,
    /// The watermark persisted at the end of the cycle, if the history was non-empty.
    pub watermark: Option<String>,
}

/// Polls a repository and reports every commit appearing on any of its branches.
pub struct Watcher<F, S, R> {
    fetcher: F,
    store: S,
    reporter: R,
    settings: WatchSettings,
    phase: Phase,
}

impl<F, S, R> Watcher<F, S, R>
where
    F: HistoryFetcher,
    S: WatermarkStore,
    R: Reporter,
{
    pub fn new(fetcher: F, store: S, reporter: R, settings: WatchSettings) -> Self {
        Self {
            fetcher,
            store,
            reporter,
            settings,
            phase: Phase::Bootstrapping,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn concurrency(&self) -> usize {
        self.settings.concurrency.max(1)
    }

    /// Polls until `cancel` fires.
    ///
    /// Cancellation is observed between cycles and interrupts the sleep; a cycle that has
    /// started always runs to completion.
    ///
    /// ## Returns
    /// - `Ok(())` - Polling was cancelled.
    /// - `Err(_)` - The watermark store failed.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), WatchError> {
        info!(interval = ?self.settings.interval, "polling started");

        while !cancel.is_cancelled() {
            match self.run_cycle().await {
                Ok(outcome) => debug!(
                    phase = ?self.phase(),
                    bootstrapped = outcome.bootstrapped,
                    reported = outcome.reported.len(),
                    skipped = outcome.skipped,
                    watermark = ?outcome.watermark,
                    "cycle complete"
                ),
                Err(e) if e.is_recoverable() => {
                    error!(error = %e, "cycle abandoned");
                    self.reporter
                        .cycle_failed(&format!(
                            "{}. Retrying in {}s...",
                            e,
                            self.settings.interval.as_secs()
                        ))
                        .await;
                }
                Err(e) => {
                    error!(error = %e, "stopping");
                    return Err(e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        info!("polling stopped");
        Ok(())
    }

    /// Runs a single cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, WatchError> {
        let history = self.fetch_history().await?;
        let persisted = self.store.read()?;
        let mut outcome = CycleOutcome::default();

        let newest = history.first().map(|c| c.sha.as_str());
        let watermark = if self.phase == Phase::Bootstrapping && persisted.is_none() {
            info!(commits = history.len(), "recording current history as seen");
            outcome.bootstrapped = true;
            self.reporter.started_recording().await;
            newest
        } else {
            if let Some(w) = persisted.as_deref() {
                if !history.iter().any(|c| c.sha == w) {
                    warn!(
                        watermark = w,
                        policy = ?self.settings.missing_watermark,
                        "watermark not found in fetched history"
                    );
                    self.reporter
                        .watermark_missing(w, self.settings.missing_watermark)
                        .await;
                }
            }
            persisted.as_deref()
        };

        let delta = select_delta(&history, watermark, self.settings.missing_watermark);
        debug!(commits = history.len(), new = delta.len(), "selected delta");
        self.report_all(&delta, &mut outcome).await;

        if let Some(newest) = newest {
            self.store.write(newest)?;
            outcome.watermark = Some(newest.to_string());
        }
        self.phase = Phase::Steady;

        Ok(outcome)
    }

    /// Fetches every branch's history and merges them. Any failure abandons the whole fetch.
    async fn fetch_history(&self) -> FetchResult<Vec<Commit>> {
        let fetcher = &self.fetcher;
        let branches = fetcher.list_branches().await?;

        let histories = stream::iter(branches)
            .map(|branch| async move {
                let commits = fetcher.list_commits(&branch.name).await?;
                Ok::<_, FetchError>((branch.name, commits))
            })
            .buffered(self.concurrency())
            .try_collect::<Vec<_>>()
            .await?;

        Ok(merge_histories(histories))
    }

    /// Fetches the details of each commit in `delta` and reports them in order. Commits whose
    /// details are unavailable are skipped.
    async fn report_all(&self, delta: &[&Commit], outcome: &mut CycleOutcome) {
        let fetcher = &self.fetcher;
        let mut details = stream::iter(delta.iter().copied())
            .map(|commit| async move { (commit, fetcher.commit_detail(&commit.sha).await) })
            .buffered(self.concurrency());

        while let Some((commit, detail)) = details.next().await {
            match detail {
                Ok(files) => {
                    self.reporter.notify(&commit.summary()).await;
                    self.reporter.report(commit, &files).await;
                    outcome
                        .reported
                        .push((commit.sha.clone(), commit.branch.clone()));
                }
                Err(e) => {
                    if e.is_not_found() {
                        warn!(sha = %commit.sha, "skipping commit, it no longer exists");
                    } else {
                        warn!(sha = %commit.sha, error = %e, "skipping commit, details unavailable");
                    }
                    self.reporter.commit_skipped(commit, &e).await;
                    outcome.skipped += 1;
                }
            }
        }
    }
}
