/// Session title for the scoping run of one issue.
pub fn scoping_session_title(repo_slug: &str, issue_number: u64) -> String {
    format!("Scope {repo_slug}#{issue_number}")
}

/// Initial prompt asking the agent for a structured scoping report that ends
/// with a literally formatted confidence line.
///
/// The template line uses placeholders so the prompt itself never parses as
/// a confidence signal.
pub fn scoping_prompt(repo_url: &str, issue_title: &str, issue_body: &str) -> String {
    format!(
        "Scope this issue in repo {repo_url}.\n\
         Title: {issue_title}\n\n\
         Body:\n{issue_body}\n\n\
         Please write your scoping in the conversation (Current / Requested / Files / Tests / Risks if any).\n\
         Include a line exactly like:\n\
         Confidence: <High|Medium|Low> <🟢|🟡|🔴> - <why>\n\
         Then wait for next instruction."
    )
}

/// Follow-up instruction asking the agent to implement the scoped change and
/// publish the pull-request URL as a structured artifact.
pub fn pr_instruction_prompt(repo_url: &str, issue_number: u64) -> String {
    format!(
        "Create a branch `devin/issue-{issue_number}` in {repo_url}.\n\
         Implement the scoped changes with minimal safe tests and open a PR.\n\
         When done, write the PR URL into structured_output.artifacts.pr_url."
    )
}
