use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use scout_core::{PollClock, PollDeadline};
use tracing::{debug, info};

use crate::agent_api_client::{AgentApiError, AgentSessionApi};

pub const DEFAULT_PR_POLL_INTERVAL: Duration = Duration::from_secs(6);
pub const DEFAULT_PR_TIMEOUT: Duration = Duration::from_secs(4_000);

fn pr_url_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https://github\.com/[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+/pull/\d+")
            .expect("pull request url regex should compile")
    })
}

/// First GitHub pull-request URL embedded in `text`.
pub fn find_pr_url(text: &str) -> Option<&str> {
    pr_url_regex().find(text).map(|found| found.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Timing for the pull-request wait.
pub struct PrPollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PrPollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PR_POLL_INTERVAL,
            timeout: DEFAULT_PR_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where a pull-request URL was observed.
pub enum PrUrlSource {
    StructuredOutput,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Terminal state of the pull-request wait.
pub enum PrPollOutcome {
    Found { url: String, source: PrUrlSource },
    TimedOut,
}

impl PrPollOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Found { url, .. } => Some(url.as_str()),
            Self::TimedOut => None,
        }
    }
}

/// Receives one callback per unsuccessful tick; purely cosmetic.
pub trait PollObserver {
    fn on_tick(&mut self, tick: usize);

    fn on_finish(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl PollObserver for SilentObserver {
    fn on_tick(&mut self, _tick: usize) {}
}

/// Polls a session until a pull-request URL shows up.
pub struct PrPoller<'a, A: AgentSessionApi + ?Sized> {
    api: &'a A,
    clock: &'a dyn PollClock,
    config: PrPollConfig,
}

impl<'a, A: AgentSessionApi + ?Sized> PrPoller<'a, A> {
    pub fn new(api: &'a A, clock: &'a dyn PollClock, config: PrPollConfig) -> Self {
        Self { api, clock, config }
    }

    /// `start_cursor` is the first message index to scan on the first tick.
    pub fn poll(
        &self,
        session_id: &str,
        start_cursor: usize,
        observer: &mut dyn PollObserver,
    ) -> Result<PrPollOutcome, AgentApiError> {
        let outcome = self.poll_until_deadline(session_id, start_cursor, observer);
        observer.on_finish();
        outcome
    }

    fn poll_until_deadline(
        &self,
        session_id: &str,
        start_cursor: usize,
        observer: &mut dyn PollObserver,
    ) -> Result<PrPollOutcome, AgentApiError> {
        let deadline = PollDeadline::after(self.clock, self.config.timeout);
        let mut seen_len = start_cursor;
        let mut tick = 0_usize;

        while !deadline.is_reached(self.clock) {
            self.clock.sleep(self.config.interval);
            let snapshot = self.api.get_session(session_id)?;
            tick = tick.saturating_add(1);

            if let Some(url) = snapshot.artifact_pr_url() {
                info!(session_id, tick, url, "pull request url found in structured output");
                return Ok(PrPollOutcome::Found {
                    url: url.to_string(),
                    source: PrUrlSource::StructuredOutput,
                });
            }

            let found = snapshot
                .messages
                .iter()
                .skip(seen_len)
                .find_map(|message| find_pr_url(&message.message));
            if let Some(url) = found {
                info!(session_id, tick, url, "pull request url found in messages");
                return Ok(PrPollOutcome::Found {
                    url: url.to_string(),
                    source: PrUrlSource::Message,
                });
            }
            seen_len = snapshot.messages.len();
            debug!(
                session_id,
                tick,
                seen_len,
                status = snapshot.status_enum.as_deref().unwrap_or("-"),
                "no pull request url yet"
            );
            observer.on_tick(tick);
        }

        info!(session_id, ticks = tick, "pull request wait timed out");
        Ok(PrPollOutcome::TimedOut)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use scout_core::ManualClock;
    use serde_json::json;

    use super::{
        find_pr_url, PollObserver, PrPollConfig, PrPollOutcome, PrPoller, PrUrlSource,
        SilentObserver,
    };
    use crate::agent_api_client::{AgentApiError, AgentSessionApi};
    use crate::session_types::{CreatedSession, SessionMessage, SessionSnapshot};

    struct ScriptedSessions {
        script: RefCell<VecDeque<SessionSnapshot>>,
        last: RefCell<SessionSnapshot>,
    }

    impl ScriptedSessions {
        fn new(script: Vec<SessionSnapshot>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                last: RefCell::new(SessionSnapshot::default()),
            }
        }
    }

    impl AgentSessionApi for ScriptedSessions {
        fn create_session(&self, _prompt: &str, _title: &str) -> Result<CreatedSession, AgentApiError> {
            unreachable!("pollers never create sessions")
        }

        fn send_message(&self, _session_id: &str, _message: &str) -> Result<(), AgentApiError> {
            unreachable!("pollers never send messages")
        }

        fn get_session(&self, _session_id: &str) -> Result<SessionSnapshot, AgentApiError> {
            if let Some(next) = self.script.borrow_mut().pop_front() {
                *self.last.borrow_mut() = next;
            }
            Ok(self.last.borrow().clone())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        ticks: Vec<usize>,
        finished: bool,
    }

    impl PollObserver for RecordingObserver {
        fn on_tick(&mut self, tick: usize) {
            self.ticks.push(tick);
        }

        fn on_finish(&mut self) {
            self.finished = true;
        }
    }

    fn message(text: &str) -> SessionMessage {
        SessionMessage::new("devin_message", text)
    }

    fn config() -> PrPollConfig {
        PrPollConfig {
            interval: Duration::from_secs(6),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn unit_pr_url_pattern_matches_pulls_only_over_https() {
        assert_eq!(
            find_pr_url("https://github.com/acme/widgets/pull/42"),
            Some("https://github.com/acme/widgets/pull/42")
        );
        assert_eq!(find_pr_url("https://github.com/acme/widgets/issues/42"), None);
        assert_eq!(find_pr_url("http://github.com/acme/widgets/pull/42"), None);
        assert_eq!(
            find_pr_url("see https://github.com/my.org/my_repo-2/pull/7)."),
            Some("https://github.com/my.org/my_repo-2/pull/7")
        );
    }

    #[test]
    fn functional_url_in_prose_on_third_tick_is_extracted_exactly() {
        let mut third = SessionSnapshot::with_messages(vec![
            message("Working on it"),
            message("Opened https://github.com/acme/widgets/pull/7 for review, thanks!"),
        ]);
        third.structured_output = json!({ "artifacts": { "pr_url": "" } });
        let empty_artifact = SessionSnapshot {
            structured_output: json!({ "artifacts": { "pr_url": "" } }),
            ..SessionSnapshot::with_messages(vec![message("Working on it")])
        };
        let api = ScriptedSessions::new(vec![empty_artifact.clone(), empty_artifact, third]);
        let clock = ManualClock::new();
        let mut observer = RecordingObserver::default();

        let outcome = PrPoller::new(&api, &clock, config())
            .poll("devin-1", 0, &mut observer)
            .expect("poll");

        assert_eq!(
            outcome,
            PrPollOutcome::Found {
                url: "https://github.com/acme/widgets/pull/7".to_string(),
                source: PrUrlSource::Message,
            }
        );
        assert_eq!(observer.ticks, vec![1, 2]);
        assert!(observer.finished);
    }

    #[test]
    fn functional_structured_output_wins_immediately() {
        let snapshot = SessionSnapshot {
            structured_output: json!({
                "artifacts": { "pr_url": "https://github.com/acme/widgets/pull/99" }
            }),
            ..SessionSnapshot::with_messages(vec![message(
                "https://github.com/acme/widgets/pull/1",
            )])
        };
        let api = ScriptedSessions::new(vec![snapshot]);
        let clock = ManualClock::new();

        let outcome = PrPoller::new(&api, &clock, config())
            .poll("devin-1", 0, &mut SilentObserver)
            .expect("poll");

        assert_eq!(outcome.url(), Some("https://github.com/acme/widgets/pull/99"));
        assert_eq!(clock.sleep_count(), 1);
    }

    #[test]
    fn regression_cursor_advances_so_old_messages_are_not_rescanned() {
        let old = SessionSnapshot::with_messages(vec![message("ignore me")]);
        let api = ScriptedSessions::new(vec![old]);
        let clock = ManualClock::new();

        let outcome = PrPoller::new(&api, &clock, config())
            .poll("devin-1", 1, &mut SilentObserver)
            .expect("poll");
        assert_eq!(outcome, PrPollOutcome::TimedOut);

        let with_url = SessionSnapshot::with_messages(vec![message(
            "https://github.com/acme/widgets/pull/3",
        )]);
        let api = ScriptedSessions::new(vec![with_url]);
        let outcome = PrPoller::new(&api, &clock, config())
            .poll("devin-1", 1, &mut SilentObserver)
            .expect("poll");
        assert_eq!(outcome, PrPollOutcome::TimedOut);
    }

    #[test]
    fn functional_timeout_reports_not_found_and_finishes_observer() {
        let api = ScriptedSessions::new(vec![SessionSnapshot::with_messages(vec![message(
            "still implementing",
        )])]);
        let clock = ManualClock::new();
        let mut observer = RecordingObserver::default();

        let outcome = PrPoller::new(&api, &clock, config())
            .poll("devin-1", 0, &mut observer)
            .expect("poll");

        assert_eq!(outcome, PrPollOutcome::TimedOut);
        assert_eq!(outcome.url(), None);
        assert_eq!(observer.ticks, vec![1, 2, 3, 4, 5]);
        assert!(observer.finished);
    }

    #[test]
    fn regression_unrepresentable_timeout_still_polls_until_artifact() {
        let pending = SessionSnapshot::with_messages(vec![message("still implementing")]);
        let done = SessionSnapshot {
            structured_output: json!({
                "artifacts": { "pr_url": "https://github.com/acme/widgets/pull/12" }
            }),
            ..pending.clone()
        };
        let api = ScriptedSessions::new(vec![pending, done]);
        let clock = ManualClock::new();
        let mut observer = RecordingObserver::default();

        let outcome = PrPoller::new(
            &api,
            &clock,
            PrPollConfig {
                interval: Duration::from_secs(6),
                timeout: Duration::from_secs(u64::MAX),
            },
        )
        .poll("devin-1", 0, &mut observer)
        .expect("poll");

        assert_eq!(outcome.url(), Some("https://github.com/acme/widgets/pull/12"));
        assert_eq!(observer.ticks, vec![1]);
        assert_eq!(clock.sleep_count(), 2);
    }
}
