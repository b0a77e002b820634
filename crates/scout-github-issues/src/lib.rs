//! GitHub issue-tracker collaborator for issue-scout.
//!
//! Provides repository slug parsing, the issue model, a blocking REST client
//! for listing and fetching issues, label filtering, and table rendering for
//! the `issues list` command.

pub mod github_api_client;
pub mod issue_filter;
pub mod issue_render;
pub mod issue_types;
pub mod repo_ref;

pub use github_api_client::{
    GithubApiError, GithubClientConfig, GithubIssuesClient, IssueLookup, DEFAULT_GITHUB_API_BASE,
};
pub use issue_filter::{
    build_required_issue_labels, issue_matches_required_labels, retain_issues_with_labels,
};
pub use issue_render::render_issue_table;
pub use issue_types::{GithubIssue, GithubIssueLabel, IssueState};
pub use repo_ref::{RepoRef, RepoRefParseError};
