//! Wire shapes of the host's REST API and their conversion into domain
//! records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ChangedFile, MergeMethod, Mergeable, PrState, PullRequestDetail, PullRequestSummary, Repo,
    ReviewEvent, StateFilter,
};

/// The host rejects page sizes above this.
pub const MAX_PER_PAGE: usize = 100;

pub fn pulls_route(repo: &Repo) -> String {
    format!("/repos/{}/{}/pulls", repo.owner(), repo.name())
}

pub fn pull_route(repo: &Repo, number: u64) -> String {
    format!("{}/{number}", pulls_route(repo))
}

pub fn files_route(repo: &Repo, number: u64) -> String {
    format!("{}/files", pull_route(repo, number))
}

pub fn reviews_route(repo: &Repo, number: u64) -> String {
    format!("{}/reviews", pull_route(repo, number))
}

pub fn merge_route(repo: &Repo, number: u64) -> String {
    format!("{}/merge", pull_route(repo, number))
}

/// Pull request conversations live on the issue with the same number.
pub fn issue_comments_route(repo: &Repo, number: u64) -> String {
    format!(
        "/repos/{}/{}/issues/{number}/comments",
        repo.owner(),
        repo.name()
    )
}

#[derive(Debug, Serialize)]
pub struct ListPullsParams {
    pub state: StateFilter,
    pub sort: &'static str,
    pub direction: &'static str,
    pub per_page: usize,
}

impl ListPullsParams {
    pub fn newest_first(state: StateFilter, limit: usize) -> Self {
        Self {
            state,
            sort: "created",
            direction: "desc",
            per_page: limit.clamp(1, MAX_PER_PAGE),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageParams {
    pub per_page: usize,
}

#[derive(Debug, Serialize)]
pub struct CommentBody<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ReviewBody<'a> {
    pub body: &'a str,
    pub event: ReviewEvent,
}

#[derive(Debug, Serialize)]
pub struct MergeBody<'a> {
    pub merge_method: MergeMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct RestUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct RestBranch {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// A pull request object. The list endpoint omits the counters and
/// mergeability, so those are optional here.
#[derive(Debug, Deserialize)]
pub struct RestPullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: Option<RestUser>,
    pub state: PrState,
    #[serde(default)]
    pub draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
    pub base: RestBranch,
    pub head: RestBranch,
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub mergeable_state: Option<String>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub commits: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
}

impl RestPullRequest {
    fn author(&self) -> String {
        self.user
            .as_ref()
            .map(|user| user.login.clone())
            .unwrap_or_else(|| "ghost".to_string())
    }

    pub fn into_summary(self) -> PullRequestSummary {
        PullRequestSummary {
            author: self.author(),
            number: self.number,
            title: self.title,
            state: self.state,
            draft: self.draft,
            updated_at: self.updated_at,
        }
    }

    pub fn into_detail(self, repo: &Repo) -> PullRequestDetail {
        PullRequestDetail {
            repo: repo.clone(),
            author: self.author(),
            number: self.number,
            title: self.title,
            state: self.state,
            draft: self.draft,
            body: self.body.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            base_ref: self.base.ref_name,
            head_ref: self.head.ref_name,
            mergeable: Mergeable::from(self.mergeable),
            mergeable_state: self.mergeable_state.unwrap_or_default(),
            comments: self.comments,
            commits: self.commits,
            additions: self.additions,
            deletions: self.deletions,
            changed_files: self.changed_files,
            url: self.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RestFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub patch: Option<String>,
}

impl From<RestFile> for ChangedFile {
    fn from(file: RestFile) -> Self {
        ChangedFile {
            filename: file.filename,
            status: file.status,
            additions: file.additions,
            deletions: file.deletions,
            patch: file.patch,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RestComment {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RestReview {
    pub id: u64,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RestMergeOutcome {
    pub merged: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sha: Option<String>,
}
