//! Chat server link with automatic bounded reconnection.

use crate::session::{ConnectionSession, LinkState, RetryDecision, RetryPolicy};
use crate::{LinkError, LinkResult, WireMessage, KIND_CHAT, KIND_SYSTEM};
use client_core::{
    Config, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY_MS, DEFAULT_SERVER_URL,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

/// Link configuration.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Chat server WebSocket URL.
    pub url: String,
    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,
    /// Reconnect attempts before the link gives up.
    pub max_attempts: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl LinkConfig {
    /// Build from client configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            url: config.server_url.clone(),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            max_attempts: config.max_reconnect_attempts,
        }
    }
}

/// Events emitted by the link.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// The connection is open and ready to send.
    Open,
    /// A reconnect attempt has been scheduled.
    Retrying { attempt: u32 },
    /// The retry budget is spent; a new setup is required.
    GaveUp,
    /// The link was deliberately closed.
    Closed,
    /// Inbound system notice.
    System(WireMessage),
    /// Inbound chat message.
    Chat(WireMessage),
}

struct LinkInner {
    config: LinkConfig,
    session: Mutex<ConnectionSession>,
    sender: Mutex<Option<mpsc::Sender<Message>>>,
    event_tx: broadcast::Sender<LinkEvent>,
}

/// The single connection to the chat server.
///
/// At most one connection exists at a time. Drops trigger reconnection at
/// a fixed delay up to a bounded number of attempts; a deliberate
/// [`close`](ChatLink::close) never does.
pub struct ChatLink {
    inner: Arc<LinkInner>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl ChatLink {
    /// Create a new link with the given configuration.
    pub fn new(config: LinkConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);

        Self {
            inner: Arc::new(LinkInner {
                config,
                session: Mutex::new(ConnectionSession::new()),
                sender: Mutex::new(None),
                event_tx,
            }),
            driver: Mutex::new(None),
        }
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LinkConfig::default())
    }

    /// Subscribe to link events.
    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Get the current link state.
    pub async fn state(&self) -> LinkState {
        self.inner.session.lock().await.state()
    }

    /// Check if the link is open.
    pub async fn is_open(&self) -> bool {
        self.inner.session.lock().await.state() == LinkState::Open
    }

    /// Start connecting to the server.
    ///
    /// Idempotent while an attempt is in flight or the link is open. After
    /// the link gave up or was closed, this starts a fresh session with a
    /// full retry budget.
    pub async fn setup(&self) -> LinkResult<()> {
        {
            let mut session = self.inner.session.lock().await;
            match session.state() {
                LinkState::Connecting | LinkState::Open => {
                    debug!("Link already active");
                    return Ok(());
                }
                _ => session.reset(),
            }
        }

        // Catch a malformed URL now rather than inside the driver
        Url::parse(&self.inner.config.url)?;

        let inner = self.inner.clone();
        let handle = tokio::spawn(Self::run(inner));
        *self.driver.lock().await = Some(handle);

        Ok(())
    }

    /// Send a message over the open link.
    pub async fn send(&self, msg: &WireMessage) -> LinkResult<()> {
        {
            let session = self.inner.session.lock().await;
            match session.state() {
                LinkState::Open => {}
                LinkState::GaveUp => {
                    return Err(LinkError::ReconnectExhausted(self.inner.config.max_attempts))
                }
                _ => return Err(LinkError::NotConnected),
            }
        }

        let sender = self.inner.sender.lock().await;
        let sender = sender.as_ref().ok_or(LinkError::NotConnected)?;

        let json = msg.to_json()?;
        sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| LinkError::Send(e.to_string()))
    }

    /// Close the link deliberately.
    ///
    /// Cancels any pending reconnect; no new connection will be made until
    /// the next [`setup`](ChatLink::setup).
    pub async fn close(&self) {
        self.inner.session.lock().await.begin_close();

        // Aborting the driver also cancels a reconnect delay in progress
        if let Some(handle) = self.driver.lock().await.take() {
            handle.abort();
        }

        *self.inner.sender.lock().await = None;
        self.inner.session.lock().await.mark_closed();

        info!("Link closed");
        let _ = self.inner.event_tx.send(LinkEvent::Closed);
    }

    /// Connection driver: one attempt per loop iteration, with fixed-delay
    /// retries until the budget is spent or the link is closed.
    async fn run(inner: Arc<LinkInner>) {
        let policy = RetryPolicy {
            delay: inner.config.reconnect_delay,
            max_attempts: inner.config.max_attempts,
        };

        loop {
            let token = inner.session.lock().await.begin_attempt();

            let url = match attempt_url(&inner.config.url, &token) {
                Ok(url) => url,
                Err(e) => {
                    error!(error = %e, "Invalid server URL");
                    inner.session.lock().await.reset();
                    return;
                }
            };

            debug!(url = %inner.config.url, "Connecting to chat server");

            match connect_async(url.as_str()).await {
                Ok((ws_stream, _)) => {
                    inner.session.lock().await.mark_open();
                    info!("Link open");
                    let _ = inner.event_tx.send(LinkEvent::Open);

                    Self::drive_open(ws_stream, &inner).await;
                    *inner.sender.lock().await = None;
                }
                Err(e) => {
                    warn!(error = %e, "Connection attempt failed");
                }
            }

            let decision = {
                let mut session = inner.session.lock().await;
                if session.state() == LinkState::Closing {
                    // close() finishes the state transition after aborting us
                    return;
                }
                session.connection_lost(&policy)
            };

            match decision {
                RetryDecision::RetryAfter(delay) => {
                    let attempt = inner.session.lock().await.reconnect_count();
                    info!(attempt, delay_ms = delay.as_millis() as u64, "Scheduling reconnect");
                    let _ = inner.event_tx.send(LinkEvent::Retrying { attempt });
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp => {
                    warn!(
                        max_attempts = inner.config.max_attempts,
                        "Reconnect attempts exhausted"
                    );
                    let _ = inner.event_tx.send(LinkEvent::GaveUp);
                    return;
                }
            }
        }
    }

    /// Pump an open connection until it drops or the server closes it.
    async fn drive_open(
        ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
        inner: &Arc<LinkInner>,
    ) {
        let (mut write, mut read) = ws_stream.split();

        let (msg_tx, mut msg_rx) = mpsc::channel::<Message>(100);
        *inner.sender.lock().await = Some(msg_tx.clone());

        let writer_handle = tokio::spawn(async move {
            while let Some(msg) = msg_rx.recv().await {
                if write.send(msg).await.is_err() {
                    break;
                }
            }
        });

        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => match WireMessage::from_json(&text) {
                    Ok(msg) => Self::dispatch(msg, &inner.event_tx),
                    Err(e) => {
                        warn!(error = %e, "Failed to parse inbound frame");
                    }
                },
                Ok(Message::Ping(data)) => {
                    let _ = msg_tx.send(Message::Pong(data)).await;
                }
                Ok(Message::Close(_)) => {
                    info!("Server closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    break;
                }
            }
        }

        writer_handle.abort();
    }

    /// Route an inbound frame to subscribers by its kind tag.
    fn dispatch(msg: WireMessage, event_tx: &broadcast::Sender<LinkEvent>) {
        match msg.kind.as_str() {
            KIND_SYSTEM => {
                let _ = event_tx.send(LinkEvent::System(msg));
            }
            KIND_CHAT => {
                let _ = event_tx.send(LinkEvent::Chat(msg));
            }
            other => {
                debug!(kind = %other, "Ignoring unrecognized message kind");
            }
        }
    }
}

/// Build the per-attempt connection URL with its single-use token.
fn attempt_url(base: &str, token: &Uuid) -> LinkResult<Url> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair("token", &token.to_string());
    Ok(url)
}
