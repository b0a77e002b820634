use crate::session_types::SessionMessage;

const USER_MESSAGE_TYPES: [&str; 2] = ["initial_user_message", "user_message"];
const API_ORIGIN: &str = "api";

/// True for messages written by the operator or sent through the API.
pub fn is_user_message(message: &SessionMessage) -> bool {
    let kind = message.kind.as_deref().unwrap_or_default().to_lowercase();
    let origin = message.origin.as_deref().unwrap_or_default();
    USER_MESSAGE_TYPES.contains(&kind.as_str()) || origin.eq_ignore_ascii_case(API_ORIGIN)
}

pub fn is_agent_message(message: &SessionMessage) -> bool {
    !is_user_message(message)
}

/// Agent-authored, non-blank texts at index `>= baseline_len`, oldest first.
pub fn new_agent_texts(messages: &[SessionMessage], baseline_len: usize) -> Vec<String> {
    messages
        .iter()
        .skip(baseline_len)
        .filter(|message| is_agent_message(message))
        .filter(|message| !message.message.trim().is_empty())
        .map(|message| message.message.clone())
        .collect()
}

/// Every non-blank text in the session regardless of author.
pub fn all_message_texts(messages: &[SessionMessage]) -> Vec<String> {
    messages
        .iter()
        .filter(|message| !message.message.trim().is_empty())
        .map(|message| message.message.clone())
        .collect()
}
