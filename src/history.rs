//! Merging of per-branch histories and selection of the commits that are new since the
//! watermark.

use crate::commit::Commit;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// What to do when the persisted watermark is not present in the merged history, e.g. after a
/// force-push or once the watermarked commit falls outside of the fetched window.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingWatermark {
    /// Every commit in the history is considered new. Previously seen commits may be reported
    /// again.
    #[default]
    ReportAll,
    /// No commit is considered new.
    ReportNone,
}

/// Merges the tip histories of several branches into one sequence, newest first.
///
/// Every commit is tagged with the branch it was listed under. Commits reachable from more than
/// one branch are kept once per branch. Commits with equal committer dates keep the order in
/// which they were supplied.
pub fn merge_histories<I>(branches: I) -> Vec<Commit>
where
    I: IntoIterator<Item = (String, Vec<Commit>)>,
{
    branches
        .into_iter()
        .flat_map(|(branch, commits)| {
            commits
                .into_iter()
                .map(move |commit| commit.on_branch(&branch))
        })
        .sorted_by(|a, b| b.committer_date.cmp(&a.committer_date))
        .collect()
}

/// Selects the commits of `history` that are newer than `watermark`, oldest first.
///
/// ## Takes
/// - `history` - The merged history, newest first.
/// - `watermark` - The sha of the last processed commit, if any.
/// - `missing` - The policy applied when `watermark` is set but absent from `history`.
///
/// ## Returns
/// - The entries preceding the first entry whose sha equals `watermark`, reversed.
/// - All of `history`, reversed, if there is no watermark or it is missing and the policy is
///   [MissingWatermark::ReportAll].
pub fn select_delta<'a>(
    history: &'a [Commit],
    watermark: Option<&str>,
    missing: MissingWatermark,
) -> Vec<&'a Commit> {
    let Some(watermark) = watermark.filter(|w| !w.is_empty()) else {
        return history.iter().rev().collect();
    };

    match history.iter().position(|c| c.sha == watermark) {
        Some(index) => history[..index].iter().rev().collect(),
        None => match missing {
            MissingWatermark::ReportAll => history.iter().rev().collect(),
            MissingWatermark::ReportNone => Vec::new(),
        },
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::{merge_histories, select_delta, MissingWatermark};
    use crate::commit::Commit;
    use chrono::{TimeZone, Utc};

    /// Builds an untagged commit with the committer date `ts` seconds after the epoch.
    pub(crate) fn commit(sha: &str, ts: i64) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: format!("commit {}", sha),
            committer_name: "octocat".to_string(),
            committer_date: Utc.timestamp_opt(ts, 0).unwrap(),
            branch: String::new(),
        }
    }

    fn shas(commits: &[&Commit]) -> Vec<String> {
        commits.iter().map(|c| c.sha.clone()).collect()
    }

    fn history() -> Vec<Commit> {
        merge_histories([(
            "main".to_string(),
            vec![commit("c3", 3), commit("c2", 2), commit("c1", 1)],
        )])
    }

    #[test]
    fn merge_sorts_newest_first_and_tags_branches() {
        let merged = merge_histories([
            ("main".to_string(), vec![commit("m2", 4), commit("m1", 1)]),
            ("dev".to_string(), vec![commit("d2", 3), commit("d1", 2)]),
        ]);

        let order = merged.iter().map(|c| c.sha.as_str()).collect::<Vec<_>>();
        assert_eq!(order, ["m2", "d2", "d1", "m1"]);
        assert_eq!(merged[1].branch, "dev");
        assert_eq!(merged[3].branch, "main");
    }

    #[test]
    fn merge_keeps_shared_commits_per_branch() {
        let merged = merge_histories([
            ("main".to_string(), vec![commit("c5", 5), commit("c4", 4)]),
            ("feature".to_string(), vec![commit("c6", 6), commit("c5", 5)]),
        ]);

        let shared = merged.iter().filter(|c| c.sha == "c5").collect::<Vec<_>>();
        assert_eq!(shared.len(), 2);
        assert_eq!(shared[0].branch, "main");
        assert_eq!(shared[1].branch, "feature");

        let delta = select_delta(&merged, Some("c4"), MissingWatermark::ReportAll);
        assert_eq!(shas(&delta), ["c5", "c5", "c6"]);
    }

    #[test]
    fn merge_is_stable_for_equal_dates() {
        let merged = merge_histories([
            ("a".to_string(), vec![commit("x", 1)]),
            ("b".to_string(), vec![commit("y", 1)]),
        ]);
        assert_eq!(merged[0].sha, "x");
        assert_eq!(merged[1].sha, "y");
    }

    #[test]
    fn delta_stops_at_watermark() {
        let history = history();
        let delta = select_delta(&history, Some("c1"), MissingWatermark::ReportAll);
        assert_eq!(shas(&delta), ["c2", "c3"]);
    }

    #[test]
    fn delta_empty_when_watermark_is_newest() {
        let history = history();
        assert!(select_delta(&history, Some("c3"), MissingWatermark::ReportAll).is_empty());
    }

    #[test]
    fn delta_without_watermark_is_whole_history() {
        let history = history();
        assert_eq!(
            shas(&select_delta(&history, None, MissingWatermark::ReportAll)),
            ["c1", "c2", "c3"]
        );
        assert_eq!(
            shas(&select_delta(&history, Some(""), MissingWatermark::ReportNone)),
            ["c1", "c2", "c3"]
        );
    }

    #[test]
    fn delta_with_unknown_watermark() {
        let history = history();
        assert_eq!(
            shas(&select_delta(&history, Some("zzz"), MissingWatermark::ReportAll)),
            ["c1", "c2", "c3"]
        );
        assert!(select_delta(&history, Some("zzz"), MissingWatermark::ReportNone).is_empty());
    }
}
