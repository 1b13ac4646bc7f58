use async_trait::async_trait;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use tracing::debug;
use url::Url;

use crate::{
    error::{Error, Result},
    rest::{self, CommentBody, ListPullsParams, MergeBody, PageParams, ReviewBody},
    types::{
        ChangedFile, Forge, MergeRequest, PullRequestDetail, PullRequestSummary, Repo, Review,
        ReviewEvent, StateFilter,
    },
};

/// Environment variables consulted for the bearer token, in order.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Picks the bearer token: the explicit value first, then each of
/// [`TOKEN_ENV_VARS`] through `lookup`. Blank values count as absent.
pub fn resolve_token<L>(explicit: Option<&str>, lookup: L) -> Result<String>
where
    L: Fn(&str) -> Option<String>,
{
    let non_blank = |value: String| {
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    };

    explicit
        .map(str::to_string)
        .and_then(non_blank)
        .or_else(|| {
            TOKEN_ENV_VARS
                .iter()
                .find_map(|name| lookup(name).and_then(non_blank))
        })
        .ok_or(Error::MissingToken)
}

/// Resolves the token against the process environment.
pub fn get_github_token(explicit: Option<&str>) -> Result<String> {
    resolve_token(explicit, |name| std::env::var(name).ok())
}

/// The GitHub REST API, authenticated with a personal access token.
pub struct GitHub {
    octocrab: Octocrab,
}

impl GitHub {
    /// Builds a client. Must be called within a Tokio runtime. Octocrab's
    /// retry layer is disabled: every failure reaches the caller.
    pub fn new(token: String, api_url: Option<&Url>) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .personal_token(token)
            .add_retry_config(RetryConfig::None);

        if let Some(url) = api_url {
            builder = builder
                .base_uri(url.as_str())
                .map_err(|e| Error::Config(format!("invalid API URL '{url}': {e}")))?;
        }

        let octocrab = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to create GitHub client: {e}")))?;

        Ok(Self { octocrab })
    }
}

/// Keeps the host's own message for API errors rather than octocrab's
/// verbose rendering.
fn host_error(context: String, err: octocrab::Error) -> Error {
    match err {
        octocrab::Error::GitHub { source, .. } => Error::host(
            context,
            format!("{} ({})", source.message, source.status_code),
        ),
        other => Error::host(context, other),
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn list_pull_requests(
        &self,
        repo: &Repo,
        state: StateFilter,
        limit: usize,
    ) -> Result<Vec<PullRequestSummary>> {
        debug!(%repo, %state, limit, "listing pull requests");

        let params = ListPullsParams::newest_first(state, limit);
        let pulls: Vec<rest::RestPullRequest> = self
            .octocrab
            .get(rest::pulls_route(repo), Some(&params))
            .await
            .map_err(|e| host_error(format!("listing pull requests in {repo}"), e))?;

        Ok(pulls
            .into_iter()
            .take(limit)
            .map(rest::RestPullRequest::into_summary)
            .collect())
    }

    async fn get_pull_request(&self, repo: &Repo, number: u64) -> Result<PullRequestDetail> {
        debug!(%repo, number, "fetching pull request");

        let pull: rest::RestPullRequest = self
            .octocrab
            .get(rest::pull_route(repo, number), None::<&()>)
            .await
            .map_err(|e| host_error(format!("getting pull request #{number} in {repo}"), e))?;

        Ok(pull.into_detail(repo))
    }

    async fn list_files(&self, repo: &Repo, number: u64) -> Result<Vec<ChangedFile>> {
        debug!(%repo, number, "listing changed files");

        let params = PageParams {
            per_page: rest::MAX_PER_PAGE,
        };
        let files: Vec<rest::RestFile> = self
            .octocrab
            .get(rest::files_route(repo, number), Some(&params))
            .await
            .map_err(|e| host_error(format!("listing files of PR #{number} in {repo}"), e))?;

        Ok(files.into_iter().map(ChangedFile::from).collect())
    }

    async fn add_comment(&self, repo: &Repo, number: u64, body: &str) -> Result<()> {
        debug!(%repo, number, "posting comment");

        let comment: rest::RestComment = self
            .octocrab
            .post(
                rest::issue_comments_route(repo, number),
                Some(&CommentBody { body }),
            )
            .await
            .map_err(|e| host_error(format!("adding comment to PR #{number} in {repo}"), e))?;

        debug!(id = comment.id, "comment created");
        Ok(())
    }

    async fn submit_review(&self, repo: &Repo, number: u64, review: &Review) -> Result<()> {
        debug!(%repo, number, event = ?review.event, "submitting review");

        let context = match review.event {
            ReviewEvent::Approve => format!("approving PR #{number} in {repo}"),
            ReviewEvent::RequestChanges => {
                format!("requesting changes on PR #{number} in {repo}")
            }
        };
        let body = ReviewBody {
            body: &review.body,
            event: review.event,
        };
        let submitted: rest::RestReview = self
            .octocrab
            .post(rest::reviews_route(repo, number), Some(&body))
            .await
            .map_err(|e| host_error(context, e))?;

        debug!(id = submitted.id, state = ?submitted.state, "review submitted");
        Ok(())
    }

    async fn merge_pull_request(
        &self,
        repo: &Repo,
        number: u64,
        request: &MergeRequest,
    ) -> Result<()> {
        debug!(%repo, number, method = %request.method, "merging pull request");

        let body = MergeBody {
            merge_method: request.method,
            commit_message: request
                .commit_message
                .as_deref()
                .filter(|message| !message.is_empty()),
        };
        let outcome: rest::RestMergeOutcome = self
            .octocrab
            .put(rest::merge_route(repo, number), Some(&body))
            .await
            .map_err(|e| host_error(format!("merging PR #{number} in {repo}"), e))?;

        if !outcome.merged {
            return Err(Error::MergeRejected {
                number,
                message: outcome.message,
            });
        }

        debug!(sha = ?outcome.sha, "merged");
        Ok(())
    }
}
