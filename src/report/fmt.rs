//! Console rendering of commit reports.

use crate::{
    commit::{ChangedFile, Commit, FileStatus},
    constants::{
        ADDED_COLOR, BRANCH_COLOR, COMMITTER_COLOR, MESSAGE_COLOR, MODIFIED_COLOR, REMOVED_COLOR,
        RULE_COLOR, RULE_WIDTH,
    },
    fetch::FetchError,
    history::MissingWatermark,
};
use nu_ansi_term::{Color, Style};
use std::fmt::{Result, Write};

/// Writes the console report for `commit` and the files it changed.
pub fn write_report<W: Write>(w: &mut W, commit: &Commit, files: &[ChangedFile]) -> Result {
    writeln!(w, "{}", RULE_COLOR.paint("=".repeat(RULE_WIDTH)))?;

    let headline = if commit.branch.is_empty() {
        "New commit is made".to_string()
    } else {
        format!("New commit is made to {}", commit.branch)
    };
    writeln!(w, "{}", BRANCH_COLOR.paint(headline))?;
    writeln!(
        w,
        "{}",
        COMMITTER_COLOR.paint(format!("Committer: {}", commit.committer_name))
    )?;
    writeln!(
        w,
        "{}",
        MESSAGE_COLOR.paint(format!("Commit message: {}", commit.message))
    )?;

    writeln!(w, "Changed files:")?;
    for file in files {
        writeln!(
            w,
            "{}",
            status_style(&file.status).paint(format!("({}) - {}:", file.status, file.path))
        )?;
        writeln!(w, "View changes: {}", file.view_url)?;
    }

    Ok(())
}

/// Writes the line announcing that commits are now being tracked.
pub fn write_started<W: Write>(w: &mut W, repository: &str) -> Result {
    writeln!(
        w,
        "{}",
        Color::Green.paint(format!("Started recording commits on {} ;)", repository))
    )
}

/// Writes the notice for a commit whose details could not be fetched.
pub fn write_skipped<W: Write>(w: &mut W, commit: &Commit, error: &FetchError) -> Result {
    writeln!(
        w,
        "{}",
        Color::Red.paint(format!(
            "Failed to fetch commit details for {} ({}). Skipping...",
            commit.sha, error
        ))
    )
}

/// Writes the notice for a watermark that no longer appears in the history.
pub fn write_missing_watermark<W: Write>(
    w: &mut W,
    watermark: &str,
    policy: MissingWatermark,
) -> Result {
    let consequence = match policy {
        MissingWatermark::ReportAll => "all visible commits are reported as new",
        MissingWatermark::ReportNone => "no commits are reported this cycle",
    };
    writeln!(
        w,
        "{}",
        Color::Yellow.paint(format!(
            "Last processed commit {} is no longer in the history (force-push?), {}.",
            watermark, consequence
        ))
    )
}

/// Writes a failed-cycle message.
pub fn write_error<W: Write>(w: &mut W, message: &str) -> Result {
    writeln!(w, "{}", Color::Red.paint(message))
}

fn status_style(status: &FileStatus) -> Style {
    match status {
        FileStatus::Added => ADDED_COLOR.normal(),
        FileStatus::Modified => MODIFIED_COLOR.normal(),
        FileStatus::Removed => REMOVED_COLOR.normal(),
        FileStatus::Other(_) => Style::new(),
    }
}

#[cfg(test)]
mod test {
    use super::{write_missing_watermark, write_report, write_skipped};
    use crate::{
        commit::{ChangedFile, FileStatus},
        fetch::FetchError,
        history::{test::commit, MissingWatermark},
    };

    #[test]
    fn renders_commit_and_files() {
        let commit = commit("abc", 1).on_branch("main");
        let files = vec![
            ChangedFile {
                path: "src/lib.rs".to_string(),
                status: FileStatus::Modified,
                view_url: "https://github.com/o/r/blob/abc/src/lib.rs".to_string(),
            },
            ChangedFile {
                path: "old.rs".to_string(),
                status: FileStatus::Other("renamed".to_string()),
                view_url: "https://github.com/o/r/blob/abc/old.rs".to_string(),
            },
        ];

        let mut buf = String::new();
        write_report(&mut buf, &commit, &files).unwrap();

        assert!(buf.contains(&"=".repeat(50)));
        assert!(buf.contains("New commit is made to main"));
        assert!(buf.contains("Committer: octocat"));
        assert!(buf.contains("Commit message: commit abc"));
        assert!(buf.contains("(modified) - src/lib.rs:"));
        assert!(buf.contains("(renamed) - old.rs:"));
        assert!(buf.contains("View changes: https://github.com/o/r/blob/abc/old.rs"));
    }

    #[test]
    fn headline_without_branch() {
        let mut buf = String::new();
        write_report(&mut buf, &commit("abc", 1), &[]).unwrap();

        assert!(buf.contains("New commit is made"));
        assert!(!buf.contains("made to"));
        assert!(buf.trim_end().ends_with("Changed files:"));
    }

    #[test]
    fn renders_skipped_commit() {
        let error = FetchError::NotFound {
            resource: "commit abc".to_string(),
        };
        let mut buf = String::new();
        write_skipped(&mut buf, &commit("abc", 1), &error).unwrap();

        assert!(buf.contains("Failed to fetch commit details for abc (commit abc not found)"));
        assert!(buf.contains("Skipping..."));
    }

    #[test]
    fn renders_missing_watermark_per_policy() {
        let mut buf = String::new();
        write_missing_watermark(&mut buf, "zzz", MissingWatermark::ReportAll).unwrap();
        assert!(buf.contains("zzz is no longer in the history"));
        assert!(buf.contains("all visible commits are reported as new"));

        let mut buf = String::new();
        write_missing_watermark(&mut buf, "zzz", MissingWatermark::ReportNone).unwrap();
        assert!(buf.contains("no commits are reported this cycle"));
    }
}
