//! WebSocket connection manager for the chat server link.
//!
//! Maintains at most one connection to the server, reconnecting on drops
//! with a fixed delay and a bounded number of attempts. Inbound frames are
//! fanned out to subscribers as [`LinkEvent`]s.

pub mod client;
pub mod error;
pub mod messages;
pub mod session;

pub use client::{ChatLink, LinkConfig, LinkEvent};
pub use error::{LinkError, LinkResult};
pub use messages::{WireMessage, KIND_CHAT, KIND_SYSTEM};
pub use session::{ConnectionSession, LinkState, RetryDecision, RetryPolicy};
