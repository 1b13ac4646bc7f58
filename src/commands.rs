use std::io::Write;

use anyhow::Result;
use chrono::Utc;

use crate::{
    cli::{
        ApproveArgs, Command, CommentArgs, FilesArgs, ListArgs, MergeArgs, PrArgs,
        RequestChangesArgs,
    },
    confirm::Confirm,
    display::{self, Palette},
    types::{Forge, MergeRequest},
};

/// Where a command's output goes and how it asks the user for consent.
pub struct Terminal<'a, W: Write> {
    pub out: &'a mut W,
    pub confirm: &'a mut dyn Confirm,
    pub palette: Palette,
}

/// Runs one parsed command: at most one call to `forge`, then rendering.
pub async fn dispatch<F, W>(command: &Command, forge: &F, term: &mut Terminal<'_, W>) -> Result<()>
where
    F: Forge + Sync,
    W: Write,
{
    match command {
        Command::List(args) => list(args, forge, term).await,
        Command::Show(args) => show(args, forge, term).await,
        Command::Files(args) => files(args, forge, term).await,
        Command::Comment(args) => comment(args, forge, term).await,
        Command::Approve(args) => approve(args, forge, term).await,
        Command::RequestChanges(args) => request_changes(args, forge, term).await,
        Command::Merge(args) => merge(args, forge, term).await,
    }
}

async fn list<F, W>(args: &ListArgs, forge: &F, term: &mut Terminal<'_, W>) -> Result<()>
where
    F: Forge + Sync,
    W: Write,
{
    let repo = args.repo.to_repo()?;
    let limit = usize::try_from(args.limit)?;

    let mut prs = forge.list_pull_requests(&repo, args.state, limit).await?;
    prs.truncate(limit);

    display::render_pr_list(&repo, args.state, &prs, term.palette, term.out)
}

async fn show<F, W>(args: &PrArgs, forge: &F, term: &mut Terminal<'_, W>) -> Result<()>
where
    F: Forge + Sync,
    W: Write,
{
    let repo = args.repo.to_repo()?;
    let pr = forge.get_pull_request(&repo, args.pr).await?;

    display::render_pr_detail(&pr, Utc::now(), term.palette, term.out)
}

async fn files<F, W>(args: &FilesArgs, forge: &F, term: &mut Terminal<'_, W>) -> Result<()>
where
    F: Forge + Sync,
    W: Write,
{
    let repo = args.target.repo.to_repo()?;
    let changed = forge.list_files(&repo, args.target.pr).await?;

    display::render_files(args.target.pr, &changed, args.patch, term.palette, term.out)
}

async fn comment<F, W>(args: &CommentArgs, forge: &F, term: &mut Terminal<'_, W>) -> Result<()>
where
    F: Forge + Sync,
    W: Write,
{
    let repo = args.target.repo.to_repo()?;
    forge
        .add_comment(&repo, args.target.pr, &args.message)
        .await?;

    display::render_comment_added(args.target.pr, term.palette, term.out)
}

async fn approve<F, W>(args: &ApproveArgs, forge: &F, term: &mut Terminal<'_, W>) -> Result<()>
where
    F: Forge + Sync,
    W: Write,
{
    let repo = args.target.repo.to_repo()?;
    forge
        .approve_pull_request(&repo, args.target.pr, args.message.as_deref())
        .await?;

    display::render_approved(args.target.pr, term.palette, term.out)
}

async fn request_changes<F, W>(
    args: &RequestChangesArgs,
    forge: &F,
    term: &mut Terminal<'_, W>,
) -> Result<()>
where
    F: Forge + Sync,
    W: Write,
{
    let repo = args.target.repo.to_repo()?;
    forge
        .request_changes(&repo, args.target.pr, &args.message)
        .await?;

    display::render_changes_requested(args.target.pr, term.palette, term.out)
}

/// Asks for confirmation unless `--yes` was given. Declining is not an
/// error.
async fn merge<F, W>(args: &MergeArgs, forge: &F, term: &mut Terminal<'_, W>) -> Result<()>
where
    F: Forge + Sync,
    W: Write,
{
    let repo = args.target.repo.to_repo()?;
    let number = args.target.pr;

    if !args.yes {
        let prompt = format!("Are you sure you want to merge PR #{number}?");
        if !term.confirm.confirm(&prompt)? {
            return display::render_merge_cancelled(term.palette, term.out);
        }
    }

    let request = MergeRequest {
        method: args.method,
        commit_message: args.message.clone().filter(|m| !m.is_empty()),
    };
    forge.merge_pull_request(&repo, number, &request).await?;

    display::render_merged(number, args.method, term.palette, term.out)
}
