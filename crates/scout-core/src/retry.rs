use std::time::Duration;

use tracing::warn;

use crate::clock::PollClock;

pub const DEFAULT_MAX_RETRIES: usize = 4;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_DELAY_STEP_MS: u64 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Bounded linear backoff: `base_delay + attempt * delay_step`.
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub delay_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            delay_step: Duration::from_millis(DEFAULT_DELAY_STEP_MS),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries `max_retries` times without waiting between attempts.
    pub fn immediate(max_retries: usize) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            delay_step: Duration::ZERO,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before the retry that follows the 0-based `attempt`.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let step = u32::try_from(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .saturating_add(self.delay_step.saturating_mul(step))
    }

    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }
}

/// Response types whose HTTP status decides whether to retry.
pub trait RetryableStatus {
    fn status_code(&self) -> u16;
}

impl RetryableStatus for reqwest::blocking::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// Failures raised before any response arrived.
pub trait TransientError: std::fmt::Display {
    fn is_transient(&self) -> bool;
}

impl TransientError for reqwest::Error {
    fn is_transient(&self) -> bool {
        !self.is_builder()
    }
}

/// Only server-side failures are retried; 4xx belongs to the caller.
pub fn is_retryable_status(status: u16) -> bool {
    (500..600).contains(&status)
}

/// Runs `attempt_fn` until it yields a non-5xx response or the retry ceiling
/// is reached.
///
/// Exhausting retries on a 5xx returns the last response unmodified;
/// exhausting retries on an error returns that error.
pub fn execute_with_retries<T, E, F>(
    policy: &RetryPolicy,
    clock: &dyn PollClock,
    mut attempt_fn: F,
) -> Result<T, E>
where
    T: RetryableStatus,
    E: TransientError,
    F: FnMut(usize) -> Result<T, E>,
{
    let mut attempt = 0_usize;
    loop {
        match attempt_fn(attempt) {
            Ok(response) => {
                let status = response.status_code();
                if !is_retryable_status(status) || attempt >= policy.max_retries {
                    return Ok(response);
                }
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    status,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "server error, retrying request"
                );
                clock.sleep(delay);
            }
            Err(error) => {
                if !error.is_transient() || attempt >= policy.max_retries {
                    return Err(error);
                }
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    %error,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "request failed, retrying"
                );
                clock.sleep(delay);
            }
        }
        attempt = attempt.saturating_add(1);
    }
}
