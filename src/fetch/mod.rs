//! Retrieval of branches and commit history from the hosting service.

use crate::commit::{Branch, ChangedFile, Commit};
use async_trait::async_trait;
use thiserror::Error;

mod github;
pub use github::GitHubClient;

/// Errors raised while talking to the hosting service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request rejected with status {status}, check the access token")]
    Unauthorized { status: u16 },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
}

impl FetchError {
    /// Returns `true` if the requested resource does not exist, as opposed to a transport or
    /// authentication failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

/// Result alias for [HistoryFetcher] operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Read access to the branches and commits of a single repository.
#[async_trait]
pub trait HistoryFetcher: Send + Sync {
    /// Lists every branch of the repository.
    async fn list_branches(&self) -> FetchResult<Vec<Branch>>;

    /// Lists the tip history of `branch`, newest first. The returned commits are not yet tagged
    /// with the branch.
    async fn list_commits(&self, branch: &str) -> FetchResult<Vec<Commit>>;

    /// Fetches the files changed by the commit `sha`.
    async fn commit_detail(&self, sha: &str) -> FetchResult<Vec<ChangedFile>>;
}
