//! Agent-service collaborator and the polling/extraction core of issue-scout.
//!
//! The agent service exposes no explicit completion signal, so this crate
//! infers progress from freeform session messages: a confidence extractor,
//! a scoping-report classifier, a baseline-cursor message accessor, and the
//! two sleep-driven pollers (scoping and pull request) built on top of them.

pub mod agent_api_client;
pub mod confidence;
pub mod message_stream;
pub mod pr_poller;
pub mod prompts;
pub mod scoping_classifier;
pub mod scoping_poller;
pub mod session_types;

pub use agent_api_client::{
    AgentApiError, AgentClient, AgentClientConfig, AgentSessionApi, DEFAULT_AGENT_API_BASE,
};
pub use confidence::{extract_confidence_from_texts, ConfidenceLevel, ConfidenceSignal};
pub use message_stream::{all_message_texts, is_agent_message, is_user_message, new_agent_texts};
pub use pr_poller::{
    find_pr_url, PollObserver, PrPollConfig, PrPollOutcome, PrPoller, PrUrlSource, SilentObserver,
};
pub use prompts::{pr_instruction_prompt, scoping_prompt, scoping_session_title};
pub use scoping_classifier::looks_like_scoping;
pub use scoping_poller::{ScopingOutcome, ScopingPhase, ScopingPollConfig, ScopingPoller};
pub use session_types::{CreatedSession, SessionMessage, SessionSnapshot};
