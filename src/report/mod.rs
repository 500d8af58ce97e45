//! Reporting of newly observed commits.

use crate::{
    commit::{ChangedFile, Commit},
    fetch::FetchError,
    history::MissingWatermark,
};
use async_trait::async_trait;

mod desktop;
mod fmt;

/// Receives the user-facing events of the poll loop.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Called once, when the first cycle records the current history as already seen.
    async fn started_recording(&self);

    /// Raises a notification with the given summary.
    async fn notify(&self, summary: &str);

    /// Emits the detailed report of a commit and the files it changed.
    async fn report(&self, commit: &Commit, files: &[ChangedFile]);

    /// Surfaces a new commit that could not be reported because its details were unavailable.
    async fn commit_skipped(&self, commit: &Commit, error: &FetchError);

    /// Surfaces a persisted watermark that is absent from the fetched history.
    async fn watermark_missing(&self, watermark: &str, policy: MissingWatermark);

    /// Surfaces a cycle that was abandoned.
    async fn cycle_failed(&self, message: &str);
}

/// A [Reporter] printing to the terminal and, optionally, raising desktop notifications.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    repository: String,
    desktop: bool,
}

impl ConsoleReporter {
    /// Creates a new [ConsoleReporter] for the repository `owner/name`.
    pub fn new(repository: String, desktop: bool) -> Self {
        Self {
            repository,
            desktop,
        }
    }
}

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn started_recording(&self) {
        let mut buf = String::new();
        if fmt::write_started(&mut buf, &self.repository).is_ok() {
            print!("{}", buf);
        }
    }

    async fn notify(&self, summary: &str) {
        if self.desktop {
            desktop::show(summary).await;
        }
    }

    async fn report(&self, commit: &Commit, files: &[ChangedFile]) {
        let mut buf = String::new();
        if fmt::write_report(&mut buf, commit, files).is_ok() {
            print!("{}", buf);
        }
    }

    async fn commit_skipped(&self, commit: &Commit, error: &FetchError) {
        let mut buf = String::new();
        if fmt::write_skipped(&mut buf, commit, error).is_ok() {
            eprint!("{}", buf);
        }
    }

    async fn watermark_missing(&self, watermark: &str, policy: MissingWatermark) {
        let mut buf = String::new();
        if fmt::write_missing_watermark(&mut buf, watermark, policy).is_ok() {
            eprint!("{}", buf);
        }
    }

    async fn cycle_failed(&self, message: &str) {
        let mut buf = String::new();
        if fmt::write_error(&mut buf, message).is_ok() {
            eprint!("{}", buf);
        }
    }
}
