//! [HistoryFetcher] backed by the GitHub REST API.

use super::{FetchError, FetchResult, HistoryFetcher};
use crate::{
    commit::{Branch, ChangedFile, Commit},
    config::Credentials,
    constants::{HTTP_TIMEOUT, USER_AGENT},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK},
    StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, trace};

/// Branches listed per request. GitHub caps pages at 100 entries.
const BRANCHES_PER_PAGE: u8 = 100;

/// A GitHub API client scoped to one repository.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    owner: String,
    repository: String,
    token: String,
    per_page: u8,
}

impl GitHubClient {
    /// Creates a new [GitHubClient].
    ///
    /// ## Takes
    /// - `api_url` - Base URL of the API, e.g. `https://api.github.com`.
    /// - `credentials` - The repository owner, name and access token.
    /// - `per_page` - Number of commits fetched per branch.
    pub fn new(api_url: &str, credentials: &Credentials, per_page: u8) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: credentials.username.clone(),
            repository: credentials.repository.clone(),
            token: credentials.access_token.clone(),
            per_page,
        })
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repository, tail
        )
    }

    /// Issues an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> FetchResult<T> {
        Ok(self.get_page(url, query, resource).await?.0)
    }

    /// Issues an authenticated GET, returning the decoded body and the URL of the next page
    /// advertised in the `Link` header, if any.
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> FetchResult<(T, Option<String>)> {
        trace!(url, ?query, "GET");
        let response = self
            .http
            .get(url)
            .query(query)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let next = next_page_url(response.headers());
            return Ok((response.json().await?, next));
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, body, resource))
    }
}

#[async_trait]
impl HistoryFetcher for GitHubClient {
    async fn list_branches(&self) -> FetchResult<Vec<Branch>> {
        let (mut branches, mut next): (Vec<BranchPayload>, _) = self
            .get_page(
                &self.repo_url("branches"),
                &[("per_page", BRANCHES_PER_PAGE.to_string())],
                "repository",
            )
            .await?;

        // Next-page URLs already carry the query.
        while let Some(url) = next.take() {
            let (page, after): (Vec<BranchPayload>, _) =
                self.get_page(&url, &[], "repository").await?;
            branches.extend(page);
            next = after;
        }
        debug!(count = branches.len(), "listed branches");

        Ok(branches
            .into_iter()
            .map(|b| Branch { name: b.name })
            .collect())
    }

    async fn list_commits(&self, branch: &str) -> FetchResult<Vec<Commit>> {
        let commits: Vec<CommitPayload> = self
            .get_json(
                &self.repo_url("commits"),
                &[
                    ("sha", branch.to_string()),
                    ("per_page", self.per_page.to_string()),
                ],
                &format!("branch {}", branch),
            )
            .await?;
        debug!(branch, count = commits.len(), "listed commits");

        Ok(commits.into_iter().map(Commit::from).collect())
    }

    async fn commit_detail(&self, sha: &str) -> FetchResult<Vec<ChangedFile>> {
        let commit: CommitPayload = self
            .get_json(
                &self.repo_url(&format!("commits/{}", sha)),
                &[],
                &format!("commit {}", sha),
            )
            .await?;

        Ok(commit.files.into_iter().map(ChangedFile::from).collect())
    }
}

/// Maps a non-success response to a [FetchError].
fn status_error(status: StatusCode, body: String, resource: &str) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => FetchError::NotFound {
            resource: resource.to_string(),
        },
        _ => FetchError::Status {
            status: status.as_u16(),
            message: serde_json::from_str::<ErrorPayload>(&body)
                .map(|e| e.message)
                .unwrap_or(body),
        },
    }
}

/// Extracts the `rel="next"` target from a `Link` header, e.g.
/// `<https://api.github.com/...&page=2>; rel="next", <...>; rel="last"`.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let (target, params) = link.split_once(';')?;
            params
                .split(';')
                .any(|param| {
                    matches!(
                        param.trim().split_once('='),
                        Some(("rel", rel)) if rel.trim_matches('"').split_whitespace().any(|r| r == "next")
                    )
                })
                .then(|| {
                    target
                        .trim()
                        .trim_start_matches('<')
                        .trim_end_matches('>')
                        .to_string()
                })
        })
}

#[derive(Debug, Deserialize)]
struct BranchPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CommitPayload {
    sha: String,
    commit: GitCommitPayload,
    #[serde(default)]
    files: Vec<FilePayload>,
}

#[derive(Debug, Deserialize)]
struct GitCommitPayload {
    message: String,
    committer: SignaturePayload,
}

#[derive(Debug, Deserialize)]
struct SignaturePayload {
    name: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct FilePayload {
    filename: String,
    status: String,
    #[serde(default)]
    blob_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: String,
}

impl From<CommitPayload> for Commit {
    fn from(payload: CommitPayload) -> Self {
        Self {
            sha: payload.sha,
            message: payload.commit.message,
            committer_name: payload.commit.committer.name,
            committer_date: payload.commit.committer.date,
            branch: String::new(),
        }
    }
}

impl From<FilePayload> for ChangedFile {
    fn from(payload: FilePayload) -> Self {
        Self {
            path: payload.filename,
            status: payload.status.as_str().into(),
            view_url: payload.blob_url.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{next_page_url, status_error, CommitPayload, GitHubClient};
    use crate::{
        commit::{ChangedFile, Commit, FileStatus},
        config::Credentials,
        fetch::FetchError,
    };
    use reqwest::{
        header::{HeaderMap, HeaderValue, LINK},
        StatusCode,
    };

    const COMMIT_JSON: &str = r#"{
        "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e",
        "commit": {
            "message": "Fix all the bugs",
            "committer": { "name": "Monalisa Octocat", "email": "m@github.com", "date": "2011-04-14T16:00:49Z" }
        },
        "files": [
            { "filename": "file1.txt", "status": "added", "blob_url": "https://github.com/o/r/blob/6dcb/file1.txt" },
            { "filename": "file2.txt", "status": "renamed" }
        ]
    }"#;

    #[test]
    fn decodes_commit_payload() {
        let payload: CommitPayload = serde_json::from_str(COMMIT_JSON).unwrap();
        let files = payload.files.into_iter().map(ChangedFile::from).collect::<Vec<_>>();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].status, FileStatus::Added);
        assert_eq!(files[0].view_url, "https://github.com/o/r/blob/6dcb/file1.txt");
        assert_eq!(files[1].status, FileStatus::Other("renamed".to_string()));
        assert_eq!(files[1].view_url, "");

        let payload: CommitPayload = serde_json::from_str(COMMIT_JSON).unwrap();
        let commit = Commit::from(payload);
        assert_eq!(commit.committer_name, "Monalisa Octocat");
        assert_eq!(commit.committer_date.to_rfc3339(), "2011-04-14T16:00:49+00:00");
        assert!(commit.branch.is_empty());
    }

    #[test]
    fn commit_listing_has_no_files() {
        let json = format!("[{}]", COMMIT_JSON.replace("\"files\"", "\"ignored\""));
        let commits: Vec<CommitPayload> = serde_json::from_str(&json).unwrap();
        assert!(commits[0].files.is_empty());
    }

    #[test]
    fn maps_status_codes() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new(), "repository"),
            FetchError::Unauthorized { status: 401 }
        ));
        assert!(status_error(StatusCode::NOT_FOUND, String::new(), "commit abc").is_not_found());

        match status_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"No commit found for SHA: x"}"#.to_string(),
            "commit x",
        ) {
            FetchError::Status { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "No commit found for SHA: x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn builds_repository_urls() {
        let credentials = Credentials {
            username: "octocat".to_string(),
            repository: "hello-world".to_string(),
            access_token: "token".to_string(),
        };
        let client = GitHubClient::new("https://api.github.com/", &credentials, 30).unwrap();
        assert_eq!(
            client.repo_url("commits/abc"),
            "https://api.github.com/repos/octocat/hello-world/commits/abc"
        );
    }

    #[test]
    fn follows_next_link() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_page_url(&headers), None);

        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://api.github.com/repositories/1/branches?per_page=100&page=1>; rel=\"prev\", \
                 <https://api.github.com/repositories/1/branches?per_page=100&page=3>; rel=\"next\", \
                 <https://api.github.com/repositories/1/branches?per_page=100&page=5>; rel=\"last\"",
            ),
        );
        assert_eq!(
            next_page_url(&headers).as_deref(),
            Some("https://api.github.com/repositories/1/branches?per_page=100&page=3")
        );

        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://api.github.com/repositories/1/branches?per_page=100&page=4>; rel=\"prev\", \
                 <https://api.github.com/repositories/1/branches?per_page=100&page=1>; rel=\"first\"",
            ),
        );
        assert_eq!(next_page_url(&headers), None);
    }
}
