/// Boxed error carried as the cause of a failed host request.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the pull-request client.
///
/// Configuration problems are detected before any request is made; every
/// other variant corresponds to exactly one request to the host.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "GitHub token is required. Pass --token or set the GITHUB_TOKEN environment variable"
    )]
    MissingToken,

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request failed: transport fault, auth rejection, not found, rate
    /// limit, and so on. `context` names the operation and its identifiers.
    #[error("error {context}: {source}")]
    Host {
        context: String,
        #[source]
        source: BoxError,
    },

    /// The host accepted the merge request but reported that nothing was
    /// merged.
    #[error("failed to merge PR #{number}: {message}")]
    MergeRejected { number: u64, message: String },
}

impl Error {
    pub fn host(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Host {
            context: context.into(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_carries_context_and_host_message() {
        let err = Error::host("getting pull request #7", "Not Found (404 Not Found)");
        assert_eq!(
            err.to_string(),
            "error getting pull request #7: Not Found (404 Not Found)"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn merge_rejection_names_the_pull_request() {
        let err = Error::MergeRejected {
            number: 12,
            message: "Head branch was modified".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to merge PR #12: Head branch was modified"
        );
    }
}
