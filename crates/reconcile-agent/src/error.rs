//! Agent error types.

use thiserror::Error;

/// Errors produced by the reconciliation agent.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Signal dispatch failed: {0}")]
    DispatchFailed(String),
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
