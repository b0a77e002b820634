use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
/// One turn of an agent session conversation.
pub struct SessionMessage {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

impl SessionMessage {
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.to_string()),
            origin: None,
            message: message.into(),
        }
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
/// Read-only view of a session fetched on one poll tick.
///
/// Messages are an append-only log: content at index `i` never changes in a
/// later snapshot, which lets pollers use a message count as a cursor.
pub struct SessionSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_enum: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<SessionMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub structured_output: Value,
}

impl SessionSnapshot {
    pub fn with_messages(messages: Vec<SessionMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Non-empty `structured_output.artifacts.pr_url`, when the agent wrote one.
    pub fn artifact_pr_url(&self) -> Option<&str> {
        self.structured_output
            .get("artifacts")
            .and_then(|artifacts| artifacts.get("pr_url"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Identity of a freshly created session.
pub struct CreatedSession {
    pub session_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub is_new_session: Option<bool>,
    #[serde(skip)]
    pub title: String,
}
