use std::time::Duration;

use scout_agent::{AgentClientConfig, PrPollConfig, ScopingPollConfig};
use scout_core::RetryPolicy;
use scout_github_issues::{GithubClientConfig, RepoRef, RepoRefParseError};
use thiserror::Error;

use crate::cli_args::Cli;

#[derive(Debug, Error)]
/// Enumerates startup configuration failures.
pub enum ConfigError {
    #[error("No repo provided. Pass --repo owner/repo or set DEFAULT_REPO.")]
    MissingRepo,
    #[error(transparent)]
    InvalidRepo(#[from] RepoRefParseError),
    #[error(
        "DEVIN_API_KEY is not set. Pass --agent-api-key or export DEVIN_API_KEY (Settings → API in the agent service)."
    )]
    MissingAgentApiKey,
}

#[derive(Debug, Clone)]
/// Immutable settings resolved once at startup and passed to every command.
pub struct ScoutConfig {
    pub github: GithubClientConfig,
    pub agent_api_base: String,
    pub agent_api_key: Option<String>,
    pub agent_opens_prs: bool,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub scoping: ScopingPollConfig,
    pub pr: PrPollConfig,
}

impl ScoutConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let request_timeout = Duration::from_secs(cli.request_timeout_secs);
        let retry = RetryPolicy::default().with_max_retries(cli.http_max_retries);
        Self {
            github: GithubClientConfig {
                api_base: cli.github_api_base.clone(),
                token: non_blank(cli.github_token.as_deref()),
                request_timeout,
                retry,
            },
            agent_api_base: cli.agent_api_base.clone(),
            agent_api_key: non_blank(cli.agent_api_key.as_deref()),
            agent_opens_prs: cli.agent_opens_prs,
            request_timeout,
            retry,
            scoping: ScopingPollConfig {
                interval: Duration::from_secs(cli.scope_poll_interval_secs),
                primary_timeout: Duration::from_secs(cli.scope_timeout_secs),
                extra_timeout: Duration::from_secs(cli.scope_extra_wait_secs),
            },
            pr: PrPollConfig {
                interval: Duration::from_secs(cli.pr_poll_interval_secs),
                timeout: Duration::from_secs(cli.pr_timeout_secs),
            },
        }
    }

    /// Agent client settings; fails before any network call when the key is absent.
    pub fn agent_client_config(&self) -> Result<AgentClientConfig, ConfigError> {
        let api_key = self
            .agent_api_key
            .clone()
            .ok_or(ConfigError::MissingAgentApiKey)?;
        Ok(AgentClientConfig {
            api_base: self.agent_api_base.clone(),
            api_key,
            request_timeout: self.request_timeout,
            create_session_timeout: self.request_timeout.saturating_mul(2),
            retry: self.retry,
        })
    }
}

/// Resolves the `--repo` / `DEFAULT_REPO` value into a repository reference.
pub fn resolve_repo(raw: Option<&str>) -> Result<RepoRef, ConfigError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingRepo)?;
    Ok(RepoRef::parse(raw)?)
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
