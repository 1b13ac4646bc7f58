use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::{
    error,
    types::{MergeMethod, Repo, StateFilter},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

fn non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("value cannot be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

fn path_segment(value: &str) -> Result<String, String> {
    let value = non_empty(value)?;
    if value.contains('/') {
        return Err(format!("'{value}' must not contain '/'"));
    }
    Ok(value)
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RepoArgs {
    /// Repository owner (organization or user)
    #[arg(short = 'o', long, value_name = "OWNER", value_parser = path_segment)]
    pub owner: String,

    /// Repository name
    #[arg(short = 'r', long, value_name = "REPO", value_parser = path_segment)]
    pub repo: String,
}

impl RepoArgs {
    pub fn to_repo(&self) -> error::Result<Repo> {
        Repo::new(&self.owner, &self.repo)
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct PrArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Pull request number
    #[arg(
        short = 'p',
        long,
        value_name = "NUMBER",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub pr: u64,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// PR state to filter by
    #[arg(short = 's', long, value_enum, default_value_t = StateFilter::Open)]
    pub state: StateFilter,

    /// Maximum number of PRs to list
    #[arg(
        short = 'l',
        long,
        value_name = "NUM",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub limit: u64,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct FilesArgs {
    #[command(flatten)]
    pub target: PrArgs,

    /// Print each file's diff below its entry
    #[arg(long)]
    pub patch: bool,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CommentArgs {
    #[command(flatten)]
    pub target: PrArgs,

    /// Comment text
    #[arg(short = 'm', long, value_name = "TEXT", value_parser = non_empty)]
    pub message: String,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ApproveArgs {
    #[command(flatten)]
    pub target: PrArgs,

    /// Optional review comment
    #[arg(short = 'm', long, value_name = "TEXT")]
    pub message: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RequestChangesArgs {
    #[command(flatten)]
    pub target: PrArgs,

    /// Comment explaining the required changes
    #[arg(short = 'm', long, value_name = "TEXT", value_parser = non_empty)]
    pub message: String,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct MergeArgs {
    #[command(flatten)]
    pub target: PrArgs,

    /// Merge method
    #[arg(short = 'M', long, value_enum, default_value_t = MergeMethod::Merge)]
    pub method: MergeMethod,

    /// Optional commit message
    #[arg(short = 'm', long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List pull requests in a repository
    List(ListArgs),
    /// Show detailed information about a pull request
    Show(PrArgs),
    /// List the files changed by a pull request
    Files(FilesArgs),
    /// Add a comment to a pull request
    Comment(CommentArgs),
    /// Submit an approving review
    Approve(ApproveArgs),
    /// Submit a review requesting changes
    RequestChanges(RequestChangesArgs),
    /// Merge a pull request
    Merge(MergeArgs),
}

#[derive(Parser, Debug)]
#[command(
    name = "pr-manager",
    about = "List, inspect, comment on, review and merge GitHub pull requests"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
pub struct Cli {
    /// GitHub personal access token (falls back to GITHUB_TOKEN, then GH_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API, for GitHub Enterprise
    #[arg(long = "api-url", global = true, env = "GITHUB_API_URL", value_name = "URL")]
    pub api_url: Option<Url>,

    /// Disable coloured output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Parses command-line arguments, including the program name.
///
/// Every required flag and value constraint is checked here, so a usage
/// error is reported before any client exists.
pub fn parse_args<I, T>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Ok(Cli::try_parse_from(args)?)
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli> {
        parse_args(std::iter::once("pr-manager").chain(args.iter().copied()))
    }

    fn clap_kind(result: Result<Cli>) -> ErrorKind {
        result
            .unwrap_err()
            .downcast_ref::<clap::Error>()
            .expect("clap error")
            .kind()
    }

    #[test]
    fn list_uses_documented_defaults() {
        let cli = parse(&["list", "-o", "octo", "-r", "widgets"]).unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.state, StateFilter::Open);
        assert_eq!(args.limit, 10);
        assert_eq!(args.repo.to_repo().unwrap().to_string(), "octo/widgets");
    }

    #[test]
    fn list_accepts_limits_beyond_one_page() {
        let cli = parse(&["list", "-o", "octo", "-r", "widgets", "-l", "150"]).unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.limit, 150);
    }

    #[test]
    fn token_is_global() {
        let cli = parse(&["show", "--owner", "o", "--repo", "r", "--pr", "3", "--token", "t"])
            .unwrap();
        assert_eq!(cli.token.as_deref(), Some("t"));
    }

    #[test]
    fn merge_defaults_to_merge_method_with_prompt() {
        let cli = parse(&["merge", "-o", "o", "-r", "r", "-p", "5"]).unwrap();
        let Command::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(args.method, MergeMethod::Merge);
        assert!(!args.yes);
        assert_eq!(args.message, None);
    }

    #[test]
    fn request_changes_parses_kebab_case_name() {
        let cli = parse(&[
            "request-changes",
            "-o",
            "o",
            "-r",
            "r",
            "-p",
            "5",
            "-m",
            "please add tests",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::RequestChanges(ref a) if a.message == "please add tests"));
    }

    #[test]
    fn missing_required_flags_are_usage_errors() {
        for args in [
            &["list", "-r", "r"][..],
            &["show", "-o", "o", "-r", "r"][..],
            &["comment", "-o", "o", "-r", "r", "-p", "1"][..],
            &["request-changes", "-o", "o", "-r", "r", "-p", "1"][..],
            &["merge", "-o", "o", "-p", "1"][..],
        ] {
            assert_eq!(
                clap_kind(parse(args)),
                ErrorKind::MissingRequiredArgument,
                "{args:?}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            clap_kind(parse(&["show", "-o", "o", "-r", "r", "-p", "0"])),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            clap_kind(parse(&["list", "-o", "o", "-r", "r", "-l", "0"])),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            clap_kind(parse(&["list", "-o", "", "-r", "r"])),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            clap_kind(parse(&["comment", "-o", "o", "-r", "r", "-p", "1", "-m", " "])),
            ErrorKind::ValueValidation
        );
    }

    #[test]
    fn rejects_unknown_state_and_method() {
        assert_eq!(
            clap_kind(parse(&["list", "-o", "o", "-r", "r", "-s", "merged"])),
            ErrorKind::InvalidValue
        );
        assert_eq!(
            clap_kind(parse(&["merge", "-o", "o", "-r", "r", "-p", "1", "-M", "ff"])),
            ErrorKind::InvalidValue
        );
    }
}
