//! Foundational plumbing shared across issue-scout crates.
//!
//! Provides the retrying blocking HTTP transport used by both remote
//! collaborators, the poll clock abstraction that pollers and retry backoff
//! sleep on, and small text helpers for error reporting.

pub mod clock;
pub mod retry;
pub mod text_utils;
pub mod transport;

pub use clock::{ManualClock, PollClock, PollDeadline, SystemClock};
pub use retry::{
    execute_with_retries, is_retryable_status, RetryPolicy, RetryableStatus, TransientError,
};
pub use text_utils::truncate_for_error;
pub use transport::{HttpTransport, TransportConfig, TransportError, TransportRequest};
