use std::time::Duration;

use scout_core::{PollClock, PollDeadline};
use tracing::{debug, info};

use crate::agent_api_client::{AgentApiError, AgentSessionApi};
use crate::message_stream::new_agent_texts;
use crate::scoping_classifier::looks_like_scoping;
use crate::session_types::SessionSnapshot;

pub const DEFAULT_SCOPING_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_SCOPING_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_SCOPING_EXTRA_WAIT: Duration = Duration::from_secs(45);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Timing for the two scoping wait windows.
pub struct ScopingPollConfig {
    pub interval: Duration,
    pub primary_timeout: Duration,
    pub extra_timeout: Duration,
}

impl Default for ScopingPollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SCOPING_POLL_INTERVAL,
            primary_timeout: DEFAULT_SCOPING_TIMEOUT,
            extra_timeout: DEFAULT_SCOPING_EXTRA_WAIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates `ScopingPhase` states of the scoping wait.
pub enum ScopingPhase {
    WaitingPrimary,
    WaitingExtra,
    Done,
}

impl ScopingPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaitingPrimary => "waiting_primary",
            Self::WaitingExtra => "waiting_extra",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Result of a scoping wait.
///
/// `texts` holds the matched report, or the earliest-seen fallback agent
/// text when nothing classified as a report; it is empty only when the agent
/// produced no text at all.
pub struct ScopingOutcome {
    pub texts: Vec<String>,
    pub matched_in: Option<ScopingPhase>,
    pub snapshot: SessionSnapshot,
    pub ticks: usize,
}

impl ScopingOutcome {
    pub fn matched(&self) -> bool {
        self.matched_in.is_some()
    }
}

/// Polls a session until an agent message looks like a scoping report.
pub struct ScopingPoller<'a, A: AgentSessionApi + ?Sized> {
    api: &'a A,
    clock: &'a dyn PollClock,
    config: ScopingPollConfig,
}

impl<'a, A: AgentSessionApi + ?Sized> ScopingPoller<'a, A> {
    pub fn new(api: &'a A, clock: &'a dyn PollClock, config: ScopingPollConfig) -> Self {
        Self { api, clock, config }
    }

    /// Waits through the primary window, then the extra window.
    ///
    /// `baseline_len` is the message count captured right after session
    /// creation; `initial` is returned as the final snapshot if no tick runs.
    pub fn poll(
        &self,
        session_id: &str,
        baseline_len: usize,
        initial: SessionSnapshot,
    ) -> Result<ScopingOutcome, AgentApiError> {
        let mut phase = ScopingPhase::WaitingPrimary;
        let mut deadline = PollDeadline::after(self.clock, self.config.primary_timeout);
        let mut fallback: Option<String> = None;
        let mut snapshot = initial;
        let mut ticks = 0_usize;

        while phase != ScopingPhase::Done {
            if deadline.is_reached(self.clock) {
                (phase, deadline) = self.next_phase(phase);
                info!(
                    session_id,
                    phase = phase.as_str(),
                    unbounded = deadline.is_unbounded(),
                    "scoping window elapsed"
                );
                continue;
            }

            self.clock.sleep(self.config.interval);
            snapshot = self.api.get_session(session_id)?;
            ticks = ticks.saturating_add(1);
            let texts = new_agent_texts(&snapshot.messages, baseline_len);
            debug!(
                session_id,
                tick = ticks,
                phase = phase.as_str(),
                status = snapshot.status_enum.as_deref().unwrap_or("-"),
                new_agent_texts = texts.len(),
                "scoping poll tick"
            );
            if let Some(report) = scan_for_report(&texts, &mut fallback) {
                info!(session_id, phase = phase.as_str(), ticks, "scoping report detected");
                return Ok(ScopingOutcome {
                    texts: vec![report],
                    matched_in: Some(phase),
                    snapshot,
                    ticks,
                });
            }
        }

        info!(
            session_id,
            ticks,
            has_fallback = fallback.is_some(),
            "no scoping report within wait windows"
        );
        Ok(ScopingOutcome {
            texts: fallback.into_iter().collect(),
            matched_in: None,
            snapshot,
            ticks,
        })
    }

    fn next_phase(&self, phase: ScopingPhase) -> (ScopingPhase, PollDeadline) {
        match phase {
            ScopingPhase::WaitingPrimary => (
                ScopingPhase::WaitingExtra,
                PollDeadline::after(self.clock, self.config.extra_timeout),
            ),
            ScopingPhase::WaitingExtra | ScopingPhase::Done => (
                ScopingPhase::Done,
                PollDeadline::after(self.clock, Duration::ZERO),
            ),
        }
    }
}

/// Scans newest-first. Non-matching texts seed the fallback once; later
/// ticks never overwrite it.
fn scan_for_report(texts: &[String], fallback: &mut Option<String>) -> Option<String> {
    for text in texts.iter().rev() {
        if looks_like_scoping(text) {
            return Some(text.clone());
        }
        if fallback.is_none() {
            *fallback = Some(text.clone());
        }
    }
    None
}
