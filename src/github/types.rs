use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A GitHub account as embedded in pull requests and comments.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

/// Open or closed, as reported by the pulls API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

/// The base branch a pull request targets.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseRef {
    #[serde(rename = "ref")]
    pub branch: String,
}

/// Pull request metadata as returned by `GET /repos/{owner}/{repo}/pulls`
/// and embedded in `pull_request` webhook payloads.
/// Fetched fresh on every run.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// PR number (e.g., 42)
    pub number: u64,
    /// API URL of the pull request; the files listing lives under `{url}/files`
    pub url: String,
    /// Issue-comments endpoint, used both for reading and posting comments
    pub comments_url: String,
    /// Author of the pull request
    pub user: User,
    pub state: PullRequestState,
    pub base: BaseRef,
    /// Fallback staleness anchor when the thread has no comments
    pub created_at: DateTime<Utc>,
}

impl PullRequest {
    /// Endpoint listing the files changed by this pull request.
    pub fn files_url(&self) -> String {
        format!("{}/files", self.url)
    }

    pub fn author(&self) -> &str {
        &self.user.login
    }
}

/// A single issue comment on a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// `null` once the author's account has been deleted
    pub user: Option<User>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn author(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.login.as_str())
    }
}

/// A file touched by a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    /// Repository-relative path (e.g., "Source/Core/Cartesian3.js")
    pub filename: String,
}
