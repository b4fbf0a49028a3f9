//! Sync signal channel abstraction.
//!
//! The agent talks to application instances only through [`SignalChannel`];
//! the trait seam keeps wake handling testable and leaves room for an
//! OS-level transport later. [`LocalSignalChannel`] is the in-process
//! implementation used when agent and application share a runtime.

use crate::{AgentError, AgentResult};
use client_core::DEFAULT_CHANNEL_NAME;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use sync_signal_types::SyncSignal;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Identifies one application instance on the channel.
pub type ClientId = Uuid;

/// Transport the agent uses to reach application instances.
pub trait SignalChannel: Send + Sync {
    /// Deliver a signal to every reachable instance.
    fn broadcast(&self, signal: &SyncSignal) -> AgentResult<()>;

    /// Instances currently reachable on the channel.
    fn clients(&self) -> Vec<ClientId>;

    /// Deliver a signal to one instance.
    fn post_to(&self, client: &ClientId, signal: &SyncSignal) -> AgentResult<()>;
}

impl<T: SignalChannel + ?Sized> SignalChannel for Arc<T> {
    fn broadcast(&self, signal: &SyncSignal) -> AgentResult<()> {
        (**self).broadcast(signal)
    }

    fn clients(&self) -> Vec<ClientId> {
        (**self).clients()
    }

    fn post_to(&self, client: &ClientId, signal: &SyncSignal) -> AgentResult<()> {
        (**self).post_to(client, signal)
    }
}

/// In-process signal channel backed by per-client broadcast queues.
///
/// A client counts as reachable while it holds its receiver; dropping the
/// receiver unregisters it implicitly.
pub struct LocalSignalChannel {
    name: String,
    clients: Mutex<HashMap<ClientId, broadcast::Sender<SyncSignal>>>,
}

impl LocalSignalChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Create with the default channel name.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CHANNEL_NAME)
    }

    /// Channel name, for log correlation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an application instance, returning its id and the stream
    /// of signals addressed to it.
    pub fn register(&self) -> (ClientId, broadcast::Receiver<SyncSignal>) {
        let id = Uuid::new_v4();
        let (tx, rx) = broadcast::channel(16);
        self.lock_clients().insert(id, tx);
        debug!(channel = %self.name, client = %id, "Client registered");
        (id, rx)
    }

    /// Remove an instance explicitly. Dropping the receiver has the same
    /// effect at the next reachability check.
    pub fn unregister(&self, client: &ClientId) {
        if self.lock_clients().remove(client).is_some() {
            debug!(channel = %self.name, client = %client, "Client unregistered");
        }
    }

    fn lock_clients(&self) -> MutexGuard<'_, HashMap<ClientId, broadcast::Sender<SyncSignal>>> {
        // A poisoned lock only means another thread panicked mid-insert;
        // the map itself is still usable.
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SignalChannel for LocalSignalChannel {
    fn broadcast(&self, signal: &SyncSignal) -> AgentResult<()> {
        let mut clients = self.lock_clients();
        clients.retain(|_, tx| tx.receiver_count() > 0);
        for tx in clients.values() {
            let _ = tx.send(signal.clone());
        }
        Ok(())
    }

    fn clients(&self) -> Vec<ClientId> {
        let mut clients = self.lock_clients();
        clients.retain(|_, tx| tx.receiver_count() > 0);
        clients.keys().copied().collect()
    }

    fn post_to(&self, client: &ClientId, signal: &SyncSignal) -> AgentResult<()> {
        let clients = self.lock_clients();
        let tx = clients
            .get(client)
            .ok_or_else(|| AgentError::DispatchFailed(format!("unknown client {client}")))?;
        tx.send(signal.clone())
            .map(|_| ())
            .map_err(|_| AgentError::DispatchFailed(format!("client {client} is gone")))
    }
}
