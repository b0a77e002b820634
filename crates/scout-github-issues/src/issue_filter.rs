use std::collections::HashSet;

use crate::issue_types::GithubIssue;

/// Normalize issue label filters for case-insensitive matching.
pub fn normalize_issue_label(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Build the normalized set of required labels from `--label` values.
pub fn build_required_issue_labels<'a>(
    labels: impl IntoIterator<Item = &'a str>,
) -> HashSet<String> {
    labels
        .into_iter()
        .map(normalize_issue_label)
        .filter(|label| !label.is_empty())
        .collect::<HashSet<_>>()
}

/// Return true when issue labels satisfy required label filters.
pub fn issue_matches_required_labels<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    required: &HashSet<String>,
) -> bool {
    if required.is_empty() {
        return true;
    }
    labels
        .into_iter()
        .map(normalize_issue_label)
        .any(|label| required.contains(&label))
}

pub fn retain_issues_with_labels(issues: &mut Vec<GithubIssue>, required: &HashSet<String>) {
    issues.retain(|issue| issue_matches_required_labels(issue.label_names(), required));
}

#[cfg(test)]
mod tests {
    use super::{
        build_required_issue_labels, issue_matches_required_labels, normalize_issue_label,
        retain_issues_with_labels,
    };
    use crate::issue_types::{GithubIssue, GithubIssueLabel};
    use std::collections::HashSet;

    fn issue(number: u64, labels: &[&str]) -> GithubIssue {
        GithubIssue {
            number,
            title: format!("issue {number}"),
            body: None,
            html_url: format!("https://github.com/acme/widgets/issues/{number}"),
            state: "open".to_string(),
            labels: labels
                .iter()
                .map(|name| GithubIssueLabel {
                    name: (*name).to_string(),
                })
                .collect(),
            pull_request: None,
        }
    }

    #[test]
    fn unit_normalize_issue_label_trims_and_lowercases() {
        assert_eq!(normalize_issue_label("  Good-First-Issue  "), "good-first-issue");
    }

    #[test]
    fn functional_build_required_issue_labels_deduplicates_and_ignores_blank_values() {
        let normalized = build_required_issue_labels(["  Bug  ", "bug", "", "  "]);
        assert_eq!(normalized.len(), 1);
        assert!(normalized.contains("bug"));
    }

    #[test]
    fn integration_issue_matches_required_labels_is_case_insensitive() {
        let required = HashSet::from([String::from("priority:high")]);
        assert!(issue_matches_required_labels(
            ["Priority:High", "enhancement"],
            &required
        ));
        assert!(!issue_matches_required_labels(["enhancement"], &required));
        assert!(issue_matches_required_labels(["anything"], &HashSet::new()));
    }

    #[test]
    fn functional_retain_issues_with_labels_keeps_matching_issues_in_order() {
        let mut issues = vec![issue(1, &["bug"]), issue(2, &["docs"]), issue(3, &["Bug", "ui"])];
        retain_issues_with_labels(&mut issues, &build_required_issue_labels(["bug"]));
        let numbers = issues.iter().map(|issue| issue.number).collect::<Vec<_>>();
        assert_eq!(numbers, vec![1, 3]);
    }
}
