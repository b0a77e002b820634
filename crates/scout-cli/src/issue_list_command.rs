use std::io::Write;

use anyhow::{Context, Result};
use scout_github_issues::{
    build_required_issue_labels, render_issue_table, retain_issues_with_labels,
    GithubIssuesClient, IssueState, RepoRef,
};
use tracing::debug;

/// Lists issues in `repo`, keeps those carrying any of `labels`, and prints the table.
pub fn execute_issue_list(
    client: &GithubIssuesClient,
    repo: &RepoRef,
    state: IssueState,
    labels: &[String],
    out: &mut dyn Write,
) -> Result<usize> {
    let mut issues = client
        .list_issues(repo, state)
        .with_context(|| format!("failed to list issues for {repo}"))?;
    let fetched = issues.len();
    let required = build_required_issue_labels(labels.iter().map(String::as_str));
    retain_issues_with_labels(&mut issues, &required);
    debug!(repo = %repo, fetched, shown = issues.len(), "issue list filtered");

    writeln!(out, "{}", render_issue_table(&repo.as_slug(), &issues))
        .context("failed to write issue table")?;
    Ok(issues.len())
}
