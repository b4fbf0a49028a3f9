//! Link error types.

use thiserror::Error;

/// Errors produced by the connection manager.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Not connected")]
    NotConnected,

    #[error("Reconnect attempts exhausted after {0} tries")]
    ReconnectExhausted(u32),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Send failed: {0}")]
    Send(String),
}

/// Result type for link operations.
pub type LinkResult<T> = Result<T, LinkError>;
