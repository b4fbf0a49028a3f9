//! Connection session state machine.
//!
//! All connection lifecycle state lives in one owned [`ConnectionSession`]
//! value; transitions are pure so the retry bound and close behavior can be
//! tested without a network.

use std::time::Duration;
use uuid::Uuid;

/// Lifecycle state of the server link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No connection and no attempt in flight.
    Disconnected,
    /// An attempt is in flight, or a retry is pending its delay.
    Connecting,
    /// Connected and ready to send.
    Open,
    /// A deliberate close is in progress; retries are suppressed.
    Closing,
    /// The retry budget is spent; a fresh setup is required.
    GaveUp,
}

/// Retry parameters for a session.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Fixed delay between attempts.
    pub delay: Duration,
    /// Consecutive failed attempts tolerated before giving up.
    pub max_attempts: u32,
}

/// What to do after a connection is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after the given delay.
    RetryAfter(Duration),
    /// Stop trying.
    GiveUp,
}

/// Owned connection lifecycle state.
pub struct ConnectionSession {
    state: LinkState,
    reconnect_count: u32,
    token: Option<Uuid>,
}

impl ConnectionSession {
    pub fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            reconnect_count: 0,
            token: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Token minted for the attempt currently in flight, if any.
    pub fn token(&self) -> Option<Uuid> {
        self.token
    }

    /// Consecutive failed attempts since the link was last open.
    pub fn reconnect_count(&self) -> u32 {
        self.reconnect_count
    }

    /// Start a connection attempt, minting a fresh session token.
    ///
    /// Tokens are single-use; every attempt, including retries, gets its
    /// own.
    pub fn begin_attempt(&mut self) -> Uuid {
        let token = Uuid::new_v4();
        self.token = Some(token);
        self.state = LinkState::Connecting;
        token
    }

    /// The attempt succeeded; the failure counter resets.
    pub fn mark_open(&mut self) {
        self.state = LinkState::Open;
        self.reconnect_count = 0;
    }

    /// The connection dropped or the attempt failed.
    ///
    /// Counts the failure against the policy budget. While a close is in
    /// progress the loss is expected and no retry is scheduled.
    pub fn connection_lost(&mut self, policy: &RetryPolicy) -> RetryDecision {
        self.token = None;

        if self.state == LinkState::Closing {
            return RetryDecision::GiveUp;
        }

        self.reconnect_count += 1;
        if self.reconnect_count > policy.max_attempts {
            self.state = LinkState::GaveUp;
            RetryDecision::GiveUp
        } else {
            // Stay in Connecting through the delay so a concurrent setup
            // call sees an attempt already in progress.
            self.state = LinkState::Connecting;
            RetryDecision::RetryAfter(policy.delay)
        }
    }

    /// A deliberate close has started; no further retries will be made.
    pub fn begin_close(&mut self) {
        self.state = LinkState::Closing;
        self.token = None;
    }

    /// The close finished.
    pub fn mark_closed(&mut self) {
        self.state = LinkState::Disconnected;
        self.reconnect_count = 0;
        self.token = None;
    }

    /// Return to a clean slate so a new setup can begin, e.g. after the
    /// retry budget was spent.
    pub fn reset(&mut self) {
        self.state = LinkState::Disconnected;
        self.reconnect_count = 0;
        self.token = None;
    }
}

impl Default for ConnectionSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            delay: Duration::from_millis(3000),
            max_attempts: 5,
        }
    }

    #[test]
    fn test_initial_state() {
        let session = ConnectionSession::new();
        assert_eq!(session.state(), LinkState::Disconnected);
        assert_eq!(session.reconnect_count(), 0);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_begin_attempt_mints_fresh_token() {
        let mut session = ConnectionSession::new();

        let first = session.begin_attempt();
        assert_eq!(session.state(), LinkState::Connecting);
        assert_eq!(session.token(), Some(first));

        let second = session.begin_attempt();
        assert_ne!(first, second);
        assert_eq!(session.token(), Some(second));
    }

    #[test]
    fn test_mark_open_resets_failure_count() {
        let mut session = ConnectionSession::new();
        let policy = test_policy();

        session.begin_attempt();
        session.connection_lost(&policy);
        session.connection_lost(&policy);
        assert_eq!(session.reconnect_count(), 2);

        session.begin_attempt();
        session.mark_open();
        assert_eq!(session.state(), LinkState::Open);
        assert_eq!(session.reconnect_count(), 0);
    }

    #[test]
    fn test_retry_bound_is_exactly_max_attempts() {
        let mut session = ConnectionSession::new();
        let policy = test_policy();

        for _ in 0..policy.max_attempts {
            session.begin_attempt();
            let decision = session.connection_lost(&policy);
            assert_eq!(decision, RetryDecision::RetryAfter(policy.delay));
            assert_eq!(session.state(), LinkState::Connecting);
        }

        session.begin_attempt();
        let decision = session.connection_lost(&policy);
        assert_eq!(decision, RetryDecision::GiveUp);
        assert_eq!(session.state(), LinkState::GaveUp);
    }

    #[test]
    fn test_retry_delay_is_fixed() {
        let mut session = ConnectionSession::new();
        let policy = test_policy();

        session.begin_attempt();
        let first = session.connection_lost(&policy);
        session.begin_attempt();
        let second = session.connection_lost(&policy);

        // No backoff: every retry waits the same configured delay
        assert_eq!(first, RetryDecision::RetryAfter(policy.delay));
        assert_eq!(second, RetryDecision::RetryAfter(policy.delay));
    }

    #[test]
    fn test_close_suppresses_retry() {
        let mut session = ConnectionSession::new();
        let policy = test_policy();

        session.begin_attempt();
        session.mark_open();
        session.begin_close();
        assert_eq!(session.state(), LinkState::Closing);

        let decision = session.connection_lost(&policy);
        assert_eq!(decision, RetryDecision::GiveUp);
        // A close never burns the retry budget into GaveUp
        assert_eq!(session.state(), LinkState::Closing);

        session.mark_closed();
        assert_eq!(session.state(), LinkState::Disconnected);
        assert_eq!(session.reconnect_count(), 0);
    }

    #[test]
    fn test_reset_after_give_up() {
        let mut session = ConnectionSession::new();
        let policy = RetryPolicy {
            delay: Duration::from_millis(1),
            max_attempts: 0,
        };

        session.begin_attempt();
        assert_eq!(session.connection_lost(&policy), RetryDecision::GiveUp);
        assert_eq!(session.state(), LinkState::GaveUp);

        session.reset();
        assert_eq!(session.state(), LinkState::Disconnected);
        assert_eq!(session.reconnect_count(), 0);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_token_cleared_on_loss_and_close() {
        let mut session = ConnectionSession::new();
        let policy = test_policy();

        session.begin_attempt();
        assert!(session.token().is_some());
        session.connection_lost(&policy);
        assert!(session.token().is_none());

        session.begin_attempt();
        session.mark_open();
        session.begin_close();
        assert!(session.token().is_none());
    }
}
