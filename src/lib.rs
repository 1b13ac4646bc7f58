//! pr-manager: pull request management from the terminal.
//!
//! Lists, inspects, comments on, reviews and merges pull requests on GitHub
//! through its REST API. Each command maps to a single API call made through
//! a [`Forge`], and its result is rendered for the terminal.

pub mod cli;
pub mod commands;
pub mod confirm;
pub mod display;
pub mod error;
pub mod github;
pub mod rest;
pub mod types;

pub use cli::{Cli, Command, parse_args};
pub use commands::{Terminal, dispatch};
pub use confirm::{Confirm, PromptConfirm};
pub use display::Palette;
pub use error::Error;
pub use github::{GitHub, get_github_token};
pub use types::{
    ChangedFile, DEFAULT_APPROVAL_MESSAGE, Forge, MergeMethod, MergeRequest, Mergeable, PrState,
    PullRequestDetail, PullRequestSummary, Repo, Review, ReviewEvent, StateFilter,
};
