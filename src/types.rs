use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Review body submitted by `approve` when no message is given.
pub const DEFAULT_APPROVAL_MESSAGE: &str = "Approved via pr-manager CLI";

/// A repository on the host, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let owner = owner.into().trim().to_string();
        let name = name.into().trim().to_string();

        if owner.is_empty() {
            return Err(Error::Config("repository owner cannot be empty".to_string()));
        }
        if name.is_empty() {
            return Err(Error::Config("repository name cannot be empty".to_string()));
        }
        if owner.contains('/') || name.contains('/') {
            return Err(Error::Config(format!(
                "owner and repository must not contain '/': '{owner}', '{name}'"
            )));
        }

        Ok(Self { owner, name })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Lifecycle state of a pull request as reported by the host. A merged
/// pull request is `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PrState::Open => "🟢",
            PrState::Closed => "🔴",
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State filter accepted by the list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    #[default]
    Merge,
    Squash,
    Rebase,
}

impl MergeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMethod::Merge => "merge",
            MergeMethod::Squash => "squash",
            MergeMethod::Rebase => "rebase",
        }
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the host considers the pull request mergeable. The host
/// computes this lazily and reports nothing until it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mergeable {
    Yes,
    No,
    Unknown,
}

impl From<Option<bool>> for Mergeable {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Mergeable::Yes,
            Some(false) => Mergeable::No,
            None => Mergeable::Unknown,
        }
    }
}

impl fmt::Display for Mergeable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mergeable::Yes => "true",
            Mergeable::No => "false",
            Mergeable::Unknown => "unknown",
        })
    }
}

/// A pull request as returned by the list operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub state: PrState,
    pub draft: bool,
    pub updated_at: DateTime<Utc>,
}

/// A single pull request with everything the host reports about it.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestDetail {
    pub repo: Repo,
    pub number: u64,
    pub title: String,
    pub author: String,
    pub state: PrState,
    pub draft: bool,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub base_ref: String,
    pub head_ref: String,
    pub mergeable: Mergeable,
    pub mergeable_state: String,
    pub comments: u64,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub url: String,
}

/// One file touched by a pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedFile {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    /// Absent for binary files and diffs the host considers too large.
    pub patch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    Approve,
    RequestChanges,
}

/// A review verdict and the text submitted with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub event: ReviewEvent,
    pub body: String,
}

impl Review {
    /// An approval. A missing or empty message becomes
    /// [`DEFAULT_APPROVAL_MESSAGE`]; anything else is sent verbatim.
    pub fn approval(message: Option<&str>) -> Self {
        let body = match message {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => DEFAULT_APPROVAL_MESSAGE.to_string(),
        };
        Self {
            event: ReviewEvent::Approve,
            body,
        }
    }

    pub fn changes_requested(message: impl Into<String>) -> Self {
        Self {
            event: ReviewEvent::RequestChanges,
            body: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeRequest {
    pub method: MergeMethod,
    pub commit_message: Option<String>,
}

/// The remote pull-request host.
///
/// Each method issues exactly one request and maps the response into domain
/// records. Nothing is cached or retried; a failure is returned as a single
/// [`Error`] carrying the operation and identifiers involved.
#[async_trait]
pub trait Forge {
    /// Pull requests in `repo` matching `state`, most recently created
    /// first, at most `limit` of them.
    async fn list_pull_requests(
        &self,
        repo: &Repo,
        state: StateFilter,
        limit: usize,
    ) -> Result<Vec<PullRequestSummary>>;

    async fn get_pull_request(&self, repo: &Repo, number: u64) -> Result<PullRequestDetail>;

    async fn list_files(&self, repo: &Repo, number: u64) -> Result<Vec<ChangedFile>>;

    async fn add_comment(&self, repo: &Repo, number: u64, body: &str) -> Result<()>;

    async fn submit_review(&self, repo: &Repo, number: u64, review: &Review) -> Result<()>;

    /// Fails with [`Error::MergeRejected`] when the host answers but does
    /// not merge.
    async fn merge_pull_request(
        &self,
        repo: &Repo,
        number: u64,
        request: &MergeRequest,
    ) -> Result<()>;

    async fn approve_pull_request(
        &self,
        repo: &Repo,
        number: u64,
        message: Option<&str>,
    ) -> Result<()> {
        self.submit_review(repo, number, &Review::approval(message))
            .await
    }

    async fn request_changes(&self, repo: &Repo, number: u64, message: &str) -> Result<()> {
        self.submit_review(repo, number, &Review::changes_requested(message))
            .await
    }
}
