//! Queue store models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message awaiting server acknowledgment.
///
/// Immutable once stored; superseding a message means removing it and
/// inserting a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMessage {
    /// Locally unique, monotonically assigned identifier. Never reused.
    pub local_id: i64,
    /// Conversation this message belongs to.
    pub chat_id: String,
    /// Opaque message content (role, text, attachments).
    pub payload: serde_json::Value,
    /// When the message was durably queued.
    pub queued_at: DateTime<Utc>,
}
