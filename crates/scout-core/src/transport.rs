use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::clock::PollClock;
use crate::retry::{execute_with_retries, RetryPolicy};

pub const RETRY_ATTEMPT_HEADER: &str = "x-scout-retry-attempt";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
/// Enumerates transport-level failures.
pub enum TransportError {
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("{method} {url} failed after {attempts} attempt(s): {source}")]
    Request {
        method: String,
        url: String,
        attempts: usize,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone)]
/// One logical request; retried attempts are rebuilt from it.
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Default)]
/// Settings applied to every request sent through one transport.
pub struct TransportConfig {
    pub default_headers: HeaderMap,
    pub retry: RetryPolicy,
}

#[derive(Clone)]
/// Blocking HTTP transport with bounded retry on network errors and 5xx.
pub struct HttpTransport {
    client: Client,
    retry: RetryPolicy,
    clock: Arc<dyn PollClock>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(config: TransportConfig, clock: Arc<dyn PollClock>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .default_headers(config.default_headers)
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self {
            client,
            retry: config.retry,
            clock,
        })
    }

    /// Sends `request`, returning the final response regardless of status.
    ///
    /// Callers interpret 4xx themselves; a 5xx is only returned after the
    /// retry ceiling was reached.
    pub fn send(&self, request: &TransportRequest) -> Result<Response, TransportError> {
        let mut attempts = 0_usize;
        let outcome = execute_with_retries(&self.retry, self.clock.as_ref(), |attempt| {
            attempts = attempt.saturating_add(1);
            debug!(method = %request.method, url = %request.url, attempt, "sending request");
            let mut builder = self
                .client
                .request(request.method.clone(), request.url.as_str())
                .headers(request.headers.clone())
                .header(RETRY_ATTEMPT_HEADER, attempt.to_string())
                .timeout(request.timeout.max(Duration::from_millis(1)));
            if let Some(body) = request.body.as_ref() {
                builder = builder.json(body);
            }
            builder.send()
        });
        outcome.map_err(|source| TransportError::Request {
            method: request.method.to_string(),
            url: request.url.clone(),
            attempts,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpTransport, TransportConfig, TransportRequest, RETRY_ATTEMPT_HEADER};
    use crate::clock::ManualClock;
    use crate::retry::RetryPolicy;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn transport(max_retries: usize, clock: Arc<ManualClock>) -> HttpTransport {
        HttpTransport::new(
            TransportConfig {
                retry: RetryPolicy::default().with_max_retries(max_retries),
                ..TransportConfig::default()
            },
            clock,
        )
        .expect("transport")
    }

    #[test]
    fn functional_not_found_is_returned_on_first_attempt() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("nope");
        });
        let clock = Arc::new(ManualClock::new());
        let response = transport(4, clock.clone())
            .send(&TransportRequest::get(server.url("/missing")))
            .expect("response");

        assert_eq!(response.status().as_u16(), 404);
        mock.assert_hits(1);
        assert_eq!(clock.sleep_count(), 0);
    }

    #[test]
    fn functional_persistent_server_error_returns_last_response_after_ceiling() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/flaky");
            then.status(503).body("unavailable");
        });
        let clock = Arc::new(ManualClock::new());
        let response = transport(2, clock.clone())
            .send(&TransportRequest::post(
                server.url("/flaky"),
                json!({ "ping": true }),
            ))
            .expect("final response");

        assert_eq!(response.status().as_u16(), 503);
        mock.assert_hits(3);
        assert_eq!(clock.sleep_count(), 2);
    }

    #[test]
    fn functional_two_unavailable_responses_then_success_yields_success() {
        let server = MockServer::start();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        server.mock(move |when, then| {
            when.method(GET).path("/recovering");
            then.respond_with(move |_req: &HttpMockRequest| {
                let status = if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    503
                } else {
                    200
                };
                HttpMockResponse::builder()
                    .status(status)
                    .body(format!("status {status}"))
                    .build()
            });
        });
        let clock = Arc::new(ManualClock::new());
        let response = transport(4, clock.clone())
            .send(&TransportRequest::get(server.url("/recovering")))
            .expect("response");

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.elapsed().as_millis(), 1_000 + 1_800);
    }

    #[test]
    fn integration_first_attempt_carries_zero_retry_header_and_json_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/echo")
                .header(RETRY_ATTEMPT_HEADER, "0")
                .json_body(json!({ "message": "hi" }));
            then.status(200).json_body(json!({ "ok": true }));
        });
        let clock = Arc::new(ManualClock::new());
        let response = transport(0, clock)
            .send(&TransportRequest::post(
                server.url("/echo"),
                json!({ "message": "hi" }),
            ))
            .expect("response");

        mock.assert();
        assert!(response.status().is_success());
    }

    #[test]
    fn regression_connection_refused_surfaces_request_error_with_attempt_count() {
        let clock = Arc::new(ManualClock::new());
        let error = transport(2, clock.clone())
            .send(&TransportRequest::get("http://127.0.0.1:9/unreachable"))
            .expect_err("connection should fail");

        match error {
            super::TransportError::Request { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(clock.sleep_count(), 2);
    }
}
