//! Command surface of issue-scout: argument parsing, startup configuration,
//! the `issues list` command, and the interactive `issues scope` workflow.

pub mod bootstrap_helpers;
pub mod cli_args;
pub mod config;
pub mod issue_list_command;
pub mod operator_prompt;
pub mod render;
pub mod scope_workflow;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use scout_agent::AgentClient;
use scout_core::{PollClock, SystemClock};
use scout_github_issues::GithubIssuesClient;

pub use cli_args::{Cli, CliCommand, IssuesCommand, IssuesListArgs, IssuesScopeArgs};
pub use config::{resolve_repo, ConfigError, ScoutConfig};
pub use issue_list_command::execute_issue_list;
pub use operator_prompt::{is_affirmative, LinePrompt, OperatorPrompt};
pub use render::{render_panel, SpinnerObserver};
pub use scope_workflow::{confidence_line, PrStep, ScopeReport, ScopeSettings, ScopeWorkflow};

/// Dispatches one parsed command line against the real collaborators.
pub fn run_cli(cli: Cli) -> Result<()> {
    let config = ScoutConfig::from_cli(&cli);
    let clock: Arc<dyn PollClock> = Arc::new(SystemClock);
    let mut stdout = io::stdout();

    match cli.command {
        CliCommand::Issues(IssuesCommand::List(args)) => {
            let repo = resolve_repo(args.repo.as_deref())?;
            let github = GithubIssuesClient::new(config.github.clone(), Arc::clone(&clock))
                .context("failed to initialize GitHub client")?;
            execute_issue_list(&github, &repo, args.state, &args.labels, &mut stdout)?;
        }
        CliCommand::Issues(IssuesCommand::Scope(args)) => {
            let repo = resolve_repo(args.repo.as_deref())?;
            let agent_config = config.agent_client_config()?;
            let github = GithubIssuesClient::new(config.github.clone(), Arc::clone(&clock))
                .context("failed to initialize GitHub client")?;
            let agent = AgentClient::new(agent_config, Arc::clone(&clock))
                .context("failed to initialize agent client")?;
            let mut prompt = LinePrompt::stdio();
            let mut spinner = SpinnerObserver::new(io::stderr());
            ScopeWorkflow {
                issues: &github,
                agent: &agent,
                clock: clock.as_ref(),
                prompt: &mut prompt,
                progress: &mut spinner,
                settings: ScopeSettings {
                    scoping: config.scoping,
                    pr: config.pr,
                    agent_opens_prs: config.agent_opens_prs,
                    open_url: args.open_url,
                },
            }
            .run(&repo, args.number, &mut stdout)?;
        }
    }

    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}
