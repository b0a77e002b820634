use clap::{ArgAction, Args, Parser, Subcommand};
use scout_agent::DEFAULT_AGENT_API_BASE;
use scout_github_issues::{IssueState, DEFAULT_GITHUB_API_BASE};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_issue_state(value: &str) -> Result<IssueState, String> {
    value.parse::<IssueState>()
}

#[derive(Debug, Parser)]
#[command(
    name = "issue-scout",
    about = "Scope GitHub issues with an autonomous coding agent and follow them to a pull request",
    version
)]
pub struct Cli {
    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        global = true,
        hide_env_values = true,
        help = "GitHub token; only needed for private repositories"
    )]
    pub github_token: Option<String>,

    #[arg(
        long = "github-api-base",
        env = "GITHUB_API_BASE",
        global = true,
        default_value = DEFAULT_GITHUB_API_BASE,
        help = "Base URL of the GitHub REST API"
    )]
    pub github_api_base: String,

    #[arg(
        long = "agent-api-key",
        env = "DEVIN_API_KEY",
        global = true,
        hide_env_values = true,
        help = "API key for the agent service (required by `issues scope`)"
    )]
    pub agent_api_key: Option<String>,

    #[arg(
        long = "agent-api-base",
        env = "DEVIN_API_BASE",
        global = true,
        default_value = DEFAULT_AGENT_API_BASE,
        help = "Base URL of the agent service API"
    )]
    pub agent_api_base: String,

    #[arg(
        long = "agent-opens-prs",
        env = "DEVIN_USE_GH_APP",
        global = true,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Let the agent open pull requests through its GitHub integration"
    )]
    pub agent_opens_prs: bool,

    #[arg(
        long = "scope-poll-interval-secs",
        global = true,
        default_value_t = 3,
        value_parser = parse_positive_u64,
        help = "Seconds between session fetches while waiting for the scoping report"
    )]
    pub scope_poll_interval_secs: u64,

    #[arg(
        long = "scope-timeout-secs",
        global = true,
        default_value_t = 120,
        help = "Primary wait window for the scoping report"
    )]
    pub scope_timeout_secs: u64,

    #[arg(
        long = "scope-extra-wait-secs",
        global = true,
        default_value_t = 45,
        help = "Extra wait window after the primary one elapses; 0 disables it"
    )]
    pub scope_extra_wait_secs: u64,

    #[arg(
        long = "pr-poll-interval-secs",
        global = true,
        default_value_t = 6,
        value_parser = parse_positive_u64,
        help = "Seconds between session fetches while waiting for a pull request"
    )]
    pub pr_poll_interval_secs: u64,

    #[arg(
        long = "pr-timeout-secs",
        global = true,
        default_value_t = 4_000,
        help = "Overall wait for a pull request URL"
    )]
    pub pr_timeout_secs: u64,

    #[arg(
        long = "request-timeout-secs",
        global = true,
        default_value_t = 30,
        value_parser = parse_positive_u64,
        help = "Per-request HTTP timeout; session creation uses twice this value"
    )]
    pub request_timeout_secs: u64,

    #[arg(
        long = "http-max-retries",
        global = true,
        default_value_t = 4,
        help = "Retries for network errors and 5xx responses"
    )]
    pub http_max_retries: usize,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Work with repository issues.
    #[command(subcommand)]
    Issues(IssuesCommand),
}

#[derive(Debug, Subcommand)]
pub enum IssuesCommand {
    /// Print a table of repository issues.
    List(IssuesListArgs),
    /// Scope one issue with the agent and optionally have it open a pull request.
    Scope(IssuesScopeArgs),
}

#[derive(Debug, Args)]
pub struct IssuesListArgs {
    #[arg(long, env = "DEFAULT_REPO", help = "Repository as owner/repo")]
    pub repo: Option<String>,

    #[arg(
        long,
        default_value = "open",
        value_parser = parse_issue_state,
        help = "Issue state: open, closed, or all"
    )]
    pub state: IssueState,

    #[arg(
        long = "label",
        help = "Only show issues carrying this label; repeat to accept several"
    )]
    pub labels: Vec<String>,
}

#[derive(Debug, Args)]
pub struct IssuesScopeArgs {
    #[arg(
        short = 'n',
        long = "number",
        value_parser = parse_positive_u64,
        help = "Issue number to scope"
    )]
    pub number: u64,

    #[arg(long, env = "DEFAULT_REPO", help = "Repository as owner/repo")]
    pub repo: Option<String>,

    #[arg(
        long = "open-url",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Print the agent session URL after creating it"
    )]
    pub open_url: bool,
}

#[cfg(test)]
mod tests {
    use super::{parse_positive_u64, Cli, CliCommand, IssuesCommand};
    use clap::Parser;
    use scout_github_issues::IssueState;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).expect("cli should parse")
    }

    #[test]
    fn unit_parse_positive_u64_rejects_zero_and_garbage() {
        assert_eq!(parse_positive_u64("6"), Ok(6));
        assert!(parse_positive_u64("0").is_err());
        assert!(parse_positive_u64("six").is_err());
    }

    #[test]
    fn functional_scope_command_parses_number_repo_and_open_url_flag() {
        let cli = parse(&[
            "issue-scout",
            "issues",
            "scope",
            "-n",
            "42",
            "--repo",
            "acme/widgets",
            "--open-url=false",
        ]);
        let CliCommand::Issues(IssuesCommand::Scope(args)) = cli.command else {
            panic!("expected scope command");
        };
        assert_eq!(args.number, 42);
        assert_eq!(args.repo.as_deref(), Some("acme/widgets"));
        assert!(!args.open_url);
    }

    #[test]
    fn functional_list_command_accepts_state_and_repeated_labels() {
        let cli = parse(&[
            "issue-scout",
            "issues",
            "list",
            "--repo",
            "acme/widgets",
            "--state",
            "closed",
            "--label",
            "bug",
            "--label",
            "ui",
        ]);
        let CliCommand::Issues(IssuesCommand::List(args)) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.state, IssueState::Closed);
        assert_eq!(args.labels, vec!["bug".to_string(), "ui".to_string()]);
    }

    #[test]
    fn unit_global_tunables_are_accepted_after_subcommand() {
        let cli = parse(&[
            "issue-scout",
            "issues",
            "scope",
            "-n",
            "7",
            "--pr-timeout-secs",
            "60",
            "--agent-opens-prs=false",
        ]);
        assert_eq!(cli.pr_timeout_secs, 60);
        assert!(!cli.agent_opens_prs);
    }

    #[test]
    fn regression_zero_issue_number_is_rejected() {
        let error = Cli::try_parse_from(["issue-scout", "issues", "scope", "-n", "0"])
            .expect_err("zero issue number");
        assert!(error.to_string().contains("greater than 0"));
    }
}
