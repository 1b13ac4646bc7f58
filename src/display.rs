use std::io::{IsTerminal, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;
use owo_colors::{OwoColorize, Style};

use crate::types::{
    ChangedFile, MergeMethod, PullRequestDetail, PullRequestSummary, Repo, StateFilter,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const COLUMN_SEPARATOR: &str = "   ";
const MAX_TITLE_CHARS: usize = 60;
const TRUNCATED_TITLE_CHARS: usize = 57;
const TITLE_TRUNCATION_SUFFIX: &str = "...";
const LIST_HEADERS: &[&str] = &["#", "Title", "Author", "State", "Draft", "Updated"];
const FILE_HEADERS: &[&str] = &["Status", "+", "-", "File"];

/// Whether stdout should receive ANSI styling.
pub fn should_use_colors(disabled: bool) -> bool {
    !disabled && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Applies styles only when colour output is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Palette {
    colors: bool,
}

impl Palette {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.colors {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint(text, Style::new().cyan().bold())
    }

    fn section(&self, text: &str, style: Style) -> String {
        self.paint(text, style.bold())
    }

    fn success(&self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    fn notice(&self, text: &str) -> String {
        self.paint(text, Style::new().yellow())
    }

    fn faint(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }
}

pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Titles longer than 60 characters keep their first 57 followed by `...`.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let kept: String = title.chars().take(TRUNCATED_TITLE_CHARS).collect();
        format!("{kept}{TITLE_TRUNCATION_SUFFIX}")
    } else {
        title.to_string()
    }
}

fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    widths
}

fn render_row<W: Write, S: AsRef<str>>(cells: &[S], widths: &[usize], writer: &mut W) -> Result<()> {
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        if i == last {
            write!(writer, "{}", cell.as_ref())?;
        } else {
            write!(writer, "{:<width$}{COLUMN_SEPARATOR}", cell.as_ref(), width = widths[i])?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

fn render_table<W: Write>(headers: &[&str], rows: &[Vec<String>], writer: &mut W) -> Result<()> {
    let widths = calculate_column_widths(headers, rows);
    let separator: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();

    render_row(headers, &widths, writer)?;
    render_row(&separator, &widths, writer)?;
    for row in rows {
        render_row(row, &widths, writer)?;
    }
    Ok(())
}

fn pr_to_table_row(pr: &PullRequestSummary) -> Vec<String> {
    vec![
        pr.number.to_string(),
        truncate_title(&pr.title),
        pr.author.clone(),
        format!("{} {}", pr.state.icon(), pr.state),
        if pr.draft { "✓" } else { "" }.to_string(),
        format_timestamp(pr.updated_at),
    ]
}

/// Renders the result of `list`: a notice when nothing matched, otherwise
/// a table in host order followed by the total.
pub fn render_pr_list<W: Write>(
    repo: &Repo,
    state: StateFilter,
    prs: &[PullRequestSummary],
    palette: Palette,
    writer: &mut W,
) -> Result<()> {
    if prs.is_empty() {
        writeln!(
            writer,
            "{}",
            palette.notice(&format!("No {state} pull requests found in {repo}"))
        )?;
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        palette.heading(&format!("Pull Requests in {repo} ({state})"))
    )?;
    writeln!(writer)?;

    let rows: Vec<Vec<String>> = prs.iter().map(pr_to_table_row).collect();
    render_table(LIST_HEADERS, &rows, writer)?;

    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        palette.faint(&format!("Total: {} pull request(s)", prs.len()))
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Renders every field of a pull request. `now` anchors the relative age.
pub fn render_pr_detail<W: Write>(
    pr: &PullRequestDetail,
    now: DateTime<Utc>,
    palette: Palette,
    writer: &mut W,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", palette.heading(&format!("═══ PR #{} ═══", pr.number)))?;
    writeln!(writer)?;

    let age = HumanTime::from(pr.updated_at - now);
    writeln!(writer, "Title:      {}", pr.title)?;
    writeln!(writer, "Repository: {}", pr.repo)?;
    writeln!(writer, "Author:     {}", pr.author)?;
    writeln!(writer, "State:      {} {}", pr.state.icon(), pr.state)?;
    writeln!(writer, "Draft:      {}", pr.draft)?;
    writeln!(writer, "Base:       {} ← Head: {}", pr.base_ref, pr.head_ref)?;
    writeln!(writer, "Created:    {}", format_timestamp(pr.created_at))?;
    writeln!(writer, "Updated:    {} ({age})", format_timestamp(pr.updated_at))?;
    writeln!(writer, "URL:        {}", pr.url)?;

    writeln!(writer)?;
    writeln!(writer, "{}", palette.section("Stats:", Style::new().yellow()))?;
    writeln!(writer, "  • Comments:      {}", pr.comments)?;
    writeln!(writer, "  • Commits:       {}", pr.commits)?;
    writeln!(writer, "  • Files changed: {}", pr.changed_files)?;
    writeln!(writer, "  • +{} / -{} lines", pr.additions, pr.deletions)?;

    writeln!(writer)?;
    if pr.mergeable_state.is_empty() {
        writeln!(writer, "Mergeable: {}", pr.mergeable)?;
    } else {
        writeln!(writer, "Mergeable: {} ({})", pr.mergeable, pr.mergeable_state)?;
    }

    if !pr.body.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "{}", palette.section("Description:", Style::new().green()))?;
        writeln!(writer, "{}", pr.body)?;
    }

    writeln!(writer)?;
    Ok(())
}

fn render_patch<W: Write>(patch: &str, palette: Palette, writer: &mut W) -> Result<()> {
    for line in patch.lines() {
        let painted = if line.starts_with("@@") {
            palette.paint(line, Style::new().cyan())
        } else if line.starts_with('+') {
            palette.paint(line, Style::new().green())
        } else if line.starts_with('-') {
            palette.paint(line, Style::new().red())
        } else {
            line.to_string()
        };
        writeln!(writer, "    {painted}")?;
    }
    Ok(())
}

/// Renders the files touched by a pull request, optionally with their
/// diffs.
pub fn render_files<W: Write>(
    number: u64,
    files: &[ChangedFile],
    show_patch: bool,
    palette: Palette,
    writer: &mut W,
) -> Result<()> {
    if files.is_empty() {
        writeln!(
            writer,
            "{}",
            palette.notice(&format!("No files changed in PR #{number}"))
        )?;
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        palette.heading(&format!("Files changed in PR #{number}"))
    )?;
    writeln!(writer)?;

    let rows: Vec<Vec<String>> = files
        .iter()
        .map(|file| {
            vec![
                file.status.clone(),
                format!("+{}", file.additions),
                format!("-{}", file.deletions),
                file.filename.clone(),
            ]
        })
        .collect();

    if show_patch {
        let widths = calculate_column_widths(FILE_HEADERS, &rows);
        render_row(FILE_HEADERS, &widths, writer)?;
        for (row, file) in rows.iter().zip(files) {
            render_row(row, &widths, writer)?;
            match &file.patch {
                Some(patch) => render_patch(patch, palette, writer)?,
                None => writeln!(writer, "    {}", palette.faint("(no textual diff)"))?,
            }
        }
    } else {
        render_table(FILE_HEADERS, &rows, writer)?;
    }

    let additions: u64 = files.iter().map(|f| f.additions).sum();
    let deletions: u64 = files.iter().map(|f| f.deletions).sum();
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        palette.faint(&format!(
            "Total: {} file(s), +{additions} / -{deletions} lines",
            files.len()
        ))
    )?;
    writeln!(writer)?;
    Ok(())
}

pub fn render_comment_added<W: Write>(number: u64, palette: Palette, writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "{}",
        palette.success(&format!("✓ Comment added successfully to PR #{number}"))
    )?;
    Ok(())
}

pub fn render_approved<W: Write>(number: u64, palette: Palette, writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "{}",
        palette.success(&format!("✓ PR #{number} approved successfully!"))
    )?;
    Ok(())
}

pub fn render_changes_requested<W: Write>(
    number: u64,
    palette: Palette,
    writer: &mut W,
) -> Result<()> {
    writeln!(
        writer,
        "{}",
        palette.notice(&format!("Changes requested on PR #{number}"))
    )?;
    Ok(())
}

pub fn render_merged<W: Write>(
    number: u64,
    method: MergeMethod,
    palette: Palette,
    writer: &mut W,
) -> Result<()> {
    writeln!(
        writer,
        "{}",
        palette.success(&format!(
            "✓ PR #{number} merged successfully using {method} method!"
        ))
    )?;
    Ok(())
}

pub fn render_merge_cancelled<W: Write>(palette: Palette, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", palette.notice("Merge cancelled"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::types::{Mergeable, PrState};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    fn summary(number: u64, title: &str, state: PrState, draft: bool) -> PullRequestSummary {
        PullRequestSummary {
            number,
            title: title.to_string(),
            author: "alice".to_string(),
            state,
            draft,
            updated_at: base_time(),
        }
    }

    fn detail() -> PullRequestDetail {
        PullRequestDetail {
            repo: Repo::new("octo", "widgets").unwrap(),
            number: 101,
            title: "Add authentication system".to_string(),
            author: "alice".to_string(),
            state: PrState::Open,
            draft: false,
            body: "Adds login.".to_string(),
            created_at: base_time() - Duration::days(2),
            updated_at: base_time() - Duration::hours(5),
            base_ref: "main".to_string(),
            head_ref: "auth".to_string(),
            mergeable: Mergeable::Unknown,
            mergeable_state: "unknown".to_string(),
            comments: 4,
            commits: 3,
            additions: 250,
            deletions: 17,
            changed_files: 9,
            url: "https://github.com/octo/widgets/pull/101".to_string(),
        }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut output = Vec::new();
        f(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn title_truncation_boundary() {
        let sixty = "x".repeat(60);
        assert_eq!(truncate_title(&sixty), sixty);

        let sixty_one = "y".repeat(61);
        let truncated = truncate_title(&sixty_one);
        assert_eq!(truncated, format!("{}...", "y".repeat(57)));
        assert_eq!(truncated.chars().count(), 60);
    }

    #[test]
    fn title_truncation_counts_characters_not_bytes() {
        let title = "é".repeat(61);
        assert_eq!(truncate_title(&title), format!("{}...", "é".repeat(57)));
    }

    #[test]
    fn empty_list_prints_notice_without_table() {
        let repo = Repo::new("octo", "widgets").unwrap();
        let output = render(|w| render_pr_list(&repo, StateFilter::Closed, &[], Palette::plain(), w));

        assert_eq!(output, "No closed pull requests found in octo/widgets\n");
    }

    #[test]
    fn list_table_has_headers_rows_and_total() {
        let repo = Repo::new("octo", "widgets").unwrap();
        let prs = vec![
            summary(7, "Fix the flux capacitor", PrState::Open, true),
            summary(3, &"long title ".repeat(10), PrState::Closed, false),
        ];
        let output = render(|w| render_pr_list(&repo, StateFilter::All, &prs, Palette::plain(), w));

        assert!(output.contains("Pull Requests in octo/widgets (all)"));
        let header = output.lines().find(|l| l.starts_with('#')).unwrap();
        for column in LIST_HEADERS {
            assert!(header.contains(column));
        }
        assert!(output.contains("🟢 open"));
        assert!(output.contains("🔴 closed"));
        assert!(output.contains("✓"));
        assert!(output.contains("2024-01-15 10:00:00"));
        assert!(output.contains(&format!("{}...", &"long title ".repeat(10)[..57])));
        assert!(output.contains("Total: 2 pull request(s)"));

        let seven = output.find("Fix the flux capacitor").unwrap();
        let three = output.find("long title").unwrap();
        assert!(seven < three, "rows keep host order");
    }

    #[test]
    fn detail_lists_every_field() {
        let output = render(|w| render_pr_detail(&detail(), base_time(), Palette::plain(), w));

        assert!(output.contains("═══ PR #101 ═══"));
        assert!(output.contains("Title:      Add authentication system"));
        assert!(output.contains("Repository: octo/widgets"));
        assert!(output.contains("Author:     alice"));
        assert!(output.contains("State:      🟢 open"));
        assert!(output.contains("Draft:      false"));
        assert!(output.contains("Base:       main ← Head: auth"));
        assert!(output.contains("Created:    2024-01-13 10:00:00"));
        assert!(output.contains("Updated:    2024-01-15 05:00:00 (5 hours ago)"));
        assert!(output.contains("URL:        https://github.com/octo/widgets/pull/101"));
        assert!(output.contains("  • Comments:      4"));
        assert!(output.contains("  • Commits:       3"));
        assert!(output.contains("  • Files changed: 9"));
        assert!(output.contains("  • +250 / -17 lines"));
        assert!(output.contains("Mergeable: unknown (unknown)"));
        assert!(output.contains("Description:\nAdds login."));
    }

    #[test]
    fn detail_omits_empty_description() {
        let mut pr = detail();
        pr.body.clear();
        pr.mergeable = Mergeable::Yes;
        pr.mergeable_state = "clean".to_string();

        let output = render(|w| render_pr_detail(&pr, base_time(), Palette::plain(), w));
        assert!(!output.contains("Description:"));
        assert!(output.contains("Mergeable: true (clean)"));
    }

    #[test]
    fn detail_drops_parentheses_without_mergeable_state() {
        let mut pr = detail();
        pr.mergeable = Mergeable::No;
        pr.mergeable_state.clear();

        let output = render(|w| render_pr_detail(&pr, base_time(), Palette::plain(), w));
        assert!(output.contains("Mergeable: false\n"));
        assert!(!output.contains("Mergeable: false ("));
    }

    #[test]
    fn files_table_with_totals_and_patch() {
        let files = vec![
            ChangedFile {
                filename: "src/lib.rs".to_string(),
                status: "modified".to_string(),
                additions: 10,
                deletions: 2,
                patch: Some("@@ -1,2 +1,3 @@\n-old\n+new\n context".to_string()),
            },
            ChangedFile {
                filename: "logo.png".to_string(),
                status: "added".to_string(),
                additions: 0,
                deletions: 0,
                patch: None,
            },
        ];

        let plain = render(|w| render_files(12, &files, false, Palette::plain(), w));
        assert!(plain.contains("Files changed in PR #12"));
        assert!(plain.contains("src/lib.rs"));
        assert!(!plain.contains("+new"));
        assert!(plain.contains("Total: 2 file(s), +10 / -2 lines"));

        let with_patch = render(|w| render_files(12, &files, true, Palette::plain(), w));
        assert!(with_patch.contains("    +new"));
        assert!(with_patch.contains("    -old"));
        assert!(with_patch.contains("(no textual diff)"));
    }

    #[test]
    fn no_files_prints_notice() {
        let output = render(|w| render_files(4, &[], false, Palette::plain(), w));
        assert_eq!(output, "No files changed in PR #4\n");
    }

    #[test]
    fn confirmations_reference_the_pull_request() {
        let palette = Palette::plain();
        assert_eq!(
            render(|w| render_comment_added(5, palette, w)),
            "✓ Comment added successfully to PR #5\n"
        );
        assert_eq!(
            render(|w| render_approved(5, palette, w)),
            "✓ PR #5 approved successfully!\n"
        );
        assert_eq!(
            render(|w| render_changes_requested(5, palette, w)),
            "Changes requested on PR #5\n"
        );
        assert_eq!(
            render(|w| render_merged(5, MergeMethod::Squash, palette, w)),
            "✓ PR #5 merged successfully using squash method!\n"
        );
    }

    #[test]
    fn colours_only_when_enabled() {
        let plain = render(|w| render_merge_cancelled(Palette::plain(), w));
        assert_eq!(plain, "Merge cancelled\n");

        let coloured = render(|w| render_merge_cancelled(Palette::new(true), w));
        assert!(coloured.contains("\u{1b}["));
        assert!(coloured.contains("Merge cancelled"));
    }
}
