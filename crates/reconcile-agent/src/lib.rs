//! Background reconciliation agent.
//!
//! Woken by the platform, the agent nudges a running application instance
//! to drain its outbox by posting a `perform-flush` signal over the sync
//! channel. The agent itself never opens the store or the server link; it
//! only signals.

pub mod agent;
pub mod channel;
pub mod error;
pub mod notices;

pub use agent::{ReconcileAgent, WakeOutcome};
pub use channel::{ClientId, LocalSignalChannel, SignalChannel};
pub use error::{AgentError, AgentResult};
pub use notices::{handle_push, notice_activated};
