//! Wake handling.
//!
//! One wake performs at most one flush handoff. The signal order is fixed:
//! `started` is announced first, then either exactly one `perform-flush`
//! goes to one reachable client, or `no-client` is broadcast. A dispatch
//! failure broadcasts `error` best-effort and re-raises to the platform so
//! it can reschedule the wake.

use crate::{AgentResult, SignalChannel};
use sync_signal_types::SyncSignal;
use tracing::{error, info, warn};
use uuid::Uuid;

/// How a wake concluded. Both outcomes are successes from the platform's
/// point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    /// One client received a `perform-flush` signal.
    Dispatched { wake_id: Uuid },
    /// No client was reachable; nothing to hand the flush to.
    NoClient { wake_id: Uuid },
}

impl WakeOutcome {
    /// Identifier correlating this wake's log lines.
    pub fn wake_id(&self) -> Uuid {
        match self {
            Self::Dispatched { wake_id } | Self::NoClient { wake_id } => *wake_id,
        }
    }
}

/// The reconciliation agent.
///
/// Stateless between wakes; everything it knows it learns from the channel
/// at wake time.
pub struct ReconcileAgent<C: SignalChannel> {
    channel: C,
}

impl<C: SignalChannel> ReconcileAgent<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Handle one platform wake.
    ///
    /// Never touches the queue store or the server link; the receiving
    /// client runs the actual drain.
    pub fn handle_wake(&self) -> AgentResult<WakeOutcome> {
        let wake_id = Uuid::new_v4();
        info!(wake_id = %wake_id, "Reconciliation wake");

        // The start announcement is informational; a failure here must not
        // prevent the flush handoff.
        if let Err(e) = self.channel.broadcast(&SyncSignal::Started) {
            warn!(wake_id = %wake_id, error = %e, "Failed to announce wake start");
        }

        let clients = self.channel.clients();
        let Some(target) = clients.first() else {
            info!(wake_id = %wake_id, "No reachable client");
            let _ = self.channel.broadcast(&SyncSignal::NoClient);
            return Ok(WakeOutcome::NoClient { wake_id });
        };

        match self.channel.post_to(target, &SyncSignal::PerformFlush) {
            Ok(()) => {
                info!(wake_id = %wake_id, client = %target, "Flush handed off");
                Ok(WakeOutcome::Dispatched { wake_id })
            }
            Err(e) => {
                error!(wake_id = %wake_id, client = %target, error = %e, "Flush dispatch failed");
                let _ = self.channel.broadcast(&SyncSignal::Error {
                    detail: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentError, ClientId};
    use std::sync::Mutex;

    /// Records every signal the agent sends; `None` target means broadcast.
    struct FakeChannel {
        clients: Vec<ClientId>,
        fail_post: bool,
        sent: Mutex<Vec<(Option<ClientId>, SyncSignal)>>,
    }

    impl FakeChannel {
        fn with_clients(count: usize) -> Self {
            Self {
                clients: (0..count).map(|_| Uuid::new_v4()).collect(),
                fail_post: false,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail_post: true,
                ..Self::with_clients(1)
            }
        }

        fn sent(&self) -> Vec<(Option<ClientId>, SyncSignal)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl SignalChannel for FakeChannel {
        fn broadcast(&self, signal: &SyncSignal) -> AgentResult<()> {
            self.sent.lock().unwrap().push((None, signal.clone()));
            Ok(())
        }

        fn clients(&self) -> Vec<ClientId> {
            self.clients.clone()
        }

        fn post_to(&self, client: &ClientId, signal: &SyncSignal) -> AgentResult<()> {
            if self.fail_post {
                return Err(AgentError::DispatchFailed("channel closed".to_string()));
            }
            self.sent.lock().unwrap().push((Some(*client), signal.clone()));
            Ok(())
        }
    }

    #[test]
    fn test_wake_announces_started_first() {
        let agent = ReconcileAgent::new(FakeChannel::with_clients(1));
        agent.handle_wake().unwrap();

        let sent = agent.channel.sent();
        assert_eq!(sent[0], (None, SyncSignal::Started));
    }

    #[test]
    fn test_wake_with_one_client_dispatches_one_flush() {
        let agent = ReconcileAgent::new(FakeChannel::with_clients(1));
        let outcome = agent.handle_wake().unwrap();

        assert!(matches!(outcome, WakeOutcome::Dispatched { .. }));

        let flushes: Vec<_> = agent
            .channel
            .sent()
            .into_iter()
            .filter(|(_, s)| *s == SyncSignal::PerformFlush)
            .collect();
        assert_eq!(flushes.len(), 1);
        assert_eq!(flushes[0].0, Some(agent.channel.clients[0]));
    }

    #[test]
    fn test_wake_with_many_clients_dispatches_exactly_once() {
        let agent = ReconcileAgent::new(FakeChannel::with_clients(3));
        let outcome = agent.handle_wake().unwrap();

        assert!(matches!(outcome, WakeOutcome::Dispatched { .. }));

        let flush_count = agent
            .channel
            .sent()
            .iter()
            .filter(|(_, s)| *s == SyncSignal::PerformFlush)
            .count();
        assert_eq!(flush_count, 1);
    }

    #[test]
    fn test_wake_with_no_clients_succeeds() {
        let agent = ReconcileAgent::new(FakeChannel::with_clients(0));
        let outcome = agent.handle_wake().unwrap();

        assert!(matches!(outcome, WakeOutcome::NoClient { .. }));

        let sent = agent.channel.sent();
        assert!(sent.contains(&(None, SyncSignal::NoClient)));
        assert!(!sent.iter().any(|(_, s)| *s == SyncSignal::PerformFlush));
    }

    #[test]
    fn test_dispatch_failure_signals_error_and_reraises() {
        let agent = ReconcileAgent::new(FakeChannel::failing());
        let result = agent.handle_wake();

        assert!(matches!(result, Err(AgentError::DispatchFailed(_))));

        // The failure is surfaced on the channel before re-raising
        let errors: Vec<_> = agent
            .channel
            .sent()
            .into_iter()
            .filter(|(_, s)| matches!(s, SyncSignal::Error { .. }))
            .collect();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_wake_ids_are_distinct() {
        let agent = ReconcileAgent::new(FakeChannel::with_clients(1));

        let first = agent.handle_wake().unwrap();
        let second = agent.handle_wake().unwrap();

        assert_ne!(first.wake_id(), second.wake_id());
    }
}
