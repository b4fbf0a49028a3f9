//! Protocol types exchanged over the sync broadcast channel.
//!
//! The reconciliation agent and application instances never share memory;
//! everything between them travels as one of these tagged records. Each
//! signal is constructed and consumed within a single broadcast round and
//! is never persisted.

use serde::{Deserialize, Serialize};

/// Default title for a push-triggered notice whose payload omits one.
pub const DEFAULT_NOTICE_TITLE: &str = "Driftchat";

/// Default body for a push-triggered notice whose payload omits one.
pub const DEFAULT_NOTICE_BODY: &str = "You have a new message.";

/// A transient notification exchanged between the reconciliation agent
/// and application instances.
///
/// New kinds can be added without breaking existing consumers; receivers
/// dispatch on the variant and ignore kinds they do not understand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SyncSignal {
    /// A reconciliation wake has begun.
    Started,
    /// No application instance was reachable for this wake.
    NoClient,
    /// The wake failed; `detail` describes why.
    Error { detail: String },
    /// Request that the receiving instance drain its pending queue.
    PerformFlush,
}

impl SyncSignal {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Payload delivered by the platform with a push notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    /// Notice title; falls back to [`DEFAULT_NOTICE_TITLE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Notice body; falls back to [`DEFAULT_NOTICE_BODY`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Target location to open when the user interacts with the notice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A user-visible notice, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    /// Build a notice from a push payload, applying defaults for any
    /// missing field.
    pub fn from_payload(payload: &PushPayload) -> Self {
        Self {
            title: payload
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_NOTICE_TITLE.to_string()),
            body: payload
                .body
                .clone()
                .unwrap_or_else(|| DEFAULT_NOTICE_BODY.to_string()),
        }
    }
}

/// Request that the platform open or focus an application window at a
/// target location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWindowRequest {
    pub url: String,
}
