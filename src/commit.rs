//! Commit metadata as observed on the hosting service.

use chrono::{DateTime, Utc};
use std::fmt::Display;

/// A commit discovered under a branch during one polling cycle.
///
/// The same sha may be observed under several branches when their histories overlap. Each
/// occurrence is a distinct reportable event, keyed by `(sha, branch)`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// The commit hash.
    pub sha: String,
    /// The full commit message.
    pub message: String,
    /// Name of the committer.
    pub committer_name: String,
    /// Committer timestamp. Only used to order commits.
    pub committer_date: DateTime<Utc>,
    /// The branch under which the commit was discovered.
    pub branch: String,
}

impl Commit {
    /// Returns a copy of the commit tagged with the given branch.
    pub fn on_branch(self, branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            ..self
        }
    }

    /// The one-line summary shown in desktop notifications.
    pub fn summary(&self) -> String {
        format!(
            "New commit by {} in {} branch:\n{}",
            self.committer_name, self.branch, self.message
        )
    }
}

/// A branch name as listed by the hosting service.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Branch {
    pub name: String,
}

/// A file touched by a commit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ChangedFile {
    /// Repository-relative path of the file.
    pub path: String,
    /// What happened to the file.
    pub status: FileStatus,
    /// A browser URL for the file at this commit.
    pub view_url: String,
}

/// The kind of change a commit made to a file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    /// Any other status reported by the host (`renamed`, `copied`, ...).
    Other(String),
}

impl From<&str> for FileStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "added" => Self::Added,
            "modified" => Self::Modified,
            "removed" => Self::Removed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
            Self::Other(raw) => write!(f, "{}", raw),
        }
    }
}
