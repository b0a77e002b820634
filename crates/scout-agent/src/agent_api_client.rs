use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use scout_core::{
    truncate_for_error, HttpTransport, PollClock, RetryPolicy, TransportConfig, TransportError,
    TransportRequest,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::session_types::{CreatedSession, SessionSnapshot};

pub const DEFAULT_AGENT_API_BASE: &str = "https://api.devin.ai/v1";
const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Error)]
/// Enumerates agent-service failures.
pub enum AgentApiError {
    #[error("DEVIN_API_KEY is not set. Get it from the agent service settings (Settings → API).")]
    MissingApiKey,
    #[error("invalid agent api key header")]
    InvalidApiKey,
    #[error("agent API 401: invalid or expired key. Regenerate it in the agent service settings.")]
    Unauthorized,
    #[error("agent api {operation} failed with status {status}: {body}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode agent {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Session operations consumed by the pollers and the scope workflow.
pub trait AgentSessionApi {
    fn create_session(&self, prompt: &str, title: &str) -> Result<CreatedSession, AgentApiError>;

    /// Fire-and-forget: only transport failures and 401 are reported.
    fn send_message(&self, session_id: &str, message: &str) -> Result<(), AgentApiError>;

    fn get_session(&self, session_id: &str) -> Result<SessionSnapshot, AgentApiError>;
}

#[derive(Debug, Clone)]
/// Public struct `AgentClientConfig` for the agent-service client.
pub struct AgentClientConfig {
    pub api_base: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub create_session_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for AgentClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_AGENT_API_BASE.to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(30),
            create_session_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
/// Blocking client for the agent session endpoints.
pub struct AgentClient {
    transport: HttpTransport,
    api_base: String,
    request_timeout: Duration,
    create_session_timeout: Duration,
}

impl AgentClient {
    pub fn new(config: AgentClientConfig, clock: Arc<dyn PollClock>) -> Result<Self, AgentApiError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(AgentApiError::MissingApiKey);
        }
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("issue-scout"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| AgentApiError::InvalidApiKey)?,
        );
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
            create_session_timeout: config.create_session_timeout,
        })
    }

    fn session_url(&self, session_id: &str) -> String {
        format!("{}/sessions/{}", self.api_base, session_id)
    }
}

impl AgentSessionApi for AgentClient {
    fn create_session(&self, prompt: &str, title: &str) -> Result<CreatedSession, AgentApiError> {
        let nonce = session_nonce(Utc::now());
        let titled = format!("{title} • {nonce}");
        let body = json!({
            "prompt": format!("{prompt}\n\n[session_nonce:{nonce}]"),
            "idempotent": false,
            "title": titled,
        });
        let request = TransportRequest::post(format!("{}/sessions", self.api_base), body)
            .with_timeout(self.create_session_timeout);
        let response = self.transport.send(&request)?;
        let mut session: CreatedSession = decode_success(response, "create session")?;
        session.title = titled;
        info!(
            session_id = %session.session_id,
            title = %session.title,
            reused = session.is_new_session == Some(false),
            "created agent session"
        );
        Ok(session)
    }

    fn send_message(&self, session_id: &str, message: &str) -> Result<(), AgentApiError> {
        let request = TransportRequest::post(
            format!("{}/message", self.session_url(session_id)),
            json!({ "message": message }),
        )
        .with_timeout(self.request_timeout);
        let response = self.transport.send(&request)?;
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(AgentApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(
                session_id,
                status = status.as_u16(),
                body = %truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
                "agent did not acknowledge message"
            );
        }
        Ok(())
    }

    fn get_session(&self, session_id: &str) -> Result<SessionSnapshot, AgentApiError> {
        let request =
            TransportRequest::get(self.session_url(session_id)).with_timeout(self.request_timeout);
        let response = self.transport.send(&request)?;
        decode_success(response, "get session")
    }
}

/// Per-invocation marker that keeps the service from reusing a session.
pub fn session_nonce(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%S.%6fZ").to_string()
}

fn decode_success<T: DeserializeOwned>(
    response: Response,
    operation: &'static str,
) -> Result<T, AgentApiError> {
    let status = response.status();
    if status.as_u16() == 401 {
        return Err(AgentApiError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(AgentApiError::HttpStatus {
            operation,
            status: status.as_u16(),
            body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
        });
    }
    response
        .json::<T>()
        .map_err(|source| AgentApiError::Decode { operation, source })
}
