use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use scout_core::{
    truncate_for_error, HttpTransport, PollClock, RetryPolicy, TransportConfig, TransportError,
    TransportRequest,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::issue_types::{GithubIssue, IssueState};
use crate::repo_ref::RepoRef;

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const ISSUES_PAGE_SIZE: usize = 100;
const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Error)]
/// Enumerates GitHub issue-tracker failures.
pub enum GithubApiError {
    #[error(
        "GitHub 401: invalid or missing GITHUB_TOKEN for private repos (public repos don't need it)"
    )]
    Unauthorized,
    #[error("Issue #{number} not found in {repo}.")]
    IssueNotFound { repo: String, number: u64 },
    #[error("github api {operation} failed with status {status}: {body}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode github {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid github authorization header")]
    InvalidToken,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone)]
/// Public struct `GithubClientConfig` for the issues REST client.
pub struct GithubClientConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GithubClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Issue lookup consumed by the scoping workflow.
pub trait IssueLookup {
    fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<GithubIssue, GithubApiError>;
}

#[derive(Debug, Clone)]
/// Blocking client for the GitHub issues endpoints.
pub struct GithubIssuesClient {
    transport: HttpTransport,
    api_base: String,
    request_timeout: Duration,
}

impl GithubIssuesClient {
    pub fn new(
        config: GithubClientConfig,
        clock: Arc<dyn PollClock>,
    ) -> Result<Self, GithubApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("issue-scout"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        if let Some(token) = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            let auth_header = format!("Bearer {token}");
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_header).map_err(|_| GithubApiError::InvalidToken)?,
            );
        }

        let transport = HttpTransport::new(
            TransportConfig {
                default_headers: headers,
                retry: config.retry,
            },
            clock,
        )?;
        Ok(Self {
            transport,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    /// Lists issues in `state`, following pagination and dropping pull requests.
    pub fn list_issues(
        &self,
        repo: &RepoRef,
        state: IssueState,
    ) -> Result<Vec<GithubIssue>, GithubApiError> {
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let url = format!(
                "{}/repos/{}/{}/issues?state={}&per_page={}&page={}",
                self.api_base,
                repo.owner,
                repo.name,
                state.as_str(),
                ISSUES_PAGE_SIZE,
                page
            );
            let response = self.get(url)?;
            let chunk: Vec<GithubIssue> = decode_success(response, "list issues")?;
            let chunk_len = chunk.len();
            debug!(repo = %repo, page, chunk_len, "fetched issue page");
            rows.extend(chunk.into_iter().filter(|issue| !issue.is_pull_request()));
            if chunk_len < ISSUES_PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }

    pub fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<GithubIssue, GithubApiError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_base, repo.owner, repo.name, number
        );
        let response = self.get(url)?;
        if response.status().as_u16() == 404 {
            return Err(GithubApiError::IssueNotFound {
                repo: repo.as_slug(),
                number,
            });
        }
        decode_success(response, "get issue")
    }

    fn get(&self, url: String) -> Result<Response, GithubApiError> {
        let request = TransportRequest::get(url).with_timeout(self.request_timeout);
        Ok(self.transport.send(&request)?)
    }
}

impl IssueLookup for GithubIssuesClient {
    fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<GithubIssue, GithubApiError> {
        GithubIssuesClient::get_issue(self, repo, number)
    }
}

fn decode_success<T: DeserializeOwned>(
    response: Response,
    operation: &'static str,
) -> Result<T, GithubApiError> {
    let status = response.status();
    if status.as_u16() == 401 {
        return Err(GithubApiError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(GithubApiError::HttpStatus {
            operation,
            status: status.as_u16(),
            body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
        });
    }
    response
        .json::<T>()
        .map_err(|source| GithubApiError::Decode { operation, source })
}
