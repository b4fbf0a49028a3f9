//! Wire message format for the chat server link.

use serde::{Deserialize, Serialize};

/// Inbound kind: server/system notices.
pub const KIND_SYSTEM: &str = "system";

/// Inbound and outbound kind: chat content.
pub const KIND_CHAT: &str = "chat";

/// A frame exchanged with the chat server.
///
/// Every frame carries a `type` tag. The kind stays a plain string so
/// frames with tags this client does not recognize survive a parse intact;
/// the dispatcher logs and drops them instead of failing the connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Message kind tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Conversation the message belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// Message content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Human-readable text, used by system notices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl WireMessage {
    /// Build an outbound chat message.
    pub fn chat(chat_id: &str, payload: serde_json::Value) -> Self {
        Self {
            kind: KIND_CHAT.to_string(),
            chat_id: Some(chat_id.to_string()),
            payload: Some(payload),
            text: None,
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
