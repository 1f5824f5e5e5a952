//! Client facade: ties the transport, connection driver, event registry and
//! cache together behind one cloneable handle.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use veristream_shared::{ClientCommand, Envelope, EventKind, ServerEvent};

use crate::config::ClientConfig;
use crate::connection::{self, ConnectionState};
use crate::dispatch::{EventRegistry, Subscription};
use crate::store::CacheStore;
use crate::transport::{Transport, WsTransport};

pub(crate) struct ClientInner {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) state: Mutex<ConnectionState>,
    pub(crate) registry: EventRegistry,
    pub(crate) cache: CacheStore,
    pub(crate) last_event: Mutex<Option<Envelope>>,
    pub(crate) outbound_tx: mpsc::UnboundedSender<String>,
    // Held by the driver task for the duration of a session.
    pub(crate) outbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
    pub(crate) epoch: watch::Sender<u64>,
    // Epoch of the driver currently owning the lifecycle, if any. A
    // disconnect() bumps the epoch, so the next connect() supersedes the
    // old driver instead of being swallowed by it.
    pub(crate) driver_epoch: Mutex<Option<u64>>,
}

impl ClientInner {
    pub(crate) fn set_state(&self, next: ConnectionState) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if *state != next {
            debug!(from = ?*state, to = ?next, "connection state");
            *state = next;
        }
    }

    /// Clear the active-driver marker if `epoch` still owns it. Returns
    /// whether this driver was still the current one.
    pub(crate) fn release_driver(&self, epoch: u64) -> bool {
        let Ok(mut active) = self.driver_epoch.lock() else {
            return false;
        };
        if *active == Some(epoch) {
            *active = None;
            true
        } else {
            false
        }
    }
}

/// Handle to the realtime sync core. Cloning is cheap and every clone
/// drives the same connection, registry and cache.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<ClientInner>,
}

impl RealtimeClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(WsTransport))
    }

    /// Build a client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (epoch, _) = watch::channel(0u64);
        Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                state: Mutex::new(ConnectionState::Disconnected),
                registry: EventRegistry::new(),
                cache: CacheStore::new(),
                last_event: Mutex::new(None),
                outbound_tx,
                outbound_rx: tokio::sync::Mutex::new(outbound_rx),
                epoch,
                driver_epoch: Mutex::new(None),
            }),
        }
    }

    /// Open the connection and start the driver task.
    ///
    /// A no-op while a driver for the current session epoch is already
    /// running (connecting, connected or waiting out a reconnect interval).
    /// Calling this right after [`RealtimeClient::disconnect`] always
    /// starts a fresh session, superseding the old driver. After the
    /// reconnection budget is exhausted, calling this again starts a fresh
    /// attempt with a fresh budget.
    pub fn connect(&self) {
        let epoch_rx = self.inner.epoch.subscribe();
        let epoch = *epoch_rx.borrow();
        {
            let Ok(mut active) = self.inner.driver_epoch.lock() else {
                return;
            };
            if *active == Some(epoch) {
                debug!("connect ignored; driver already active");
                return;
            }
            *active = Some(epoch);
        }
        self.inner.set_state(ConnectionState::Connecting);
        tokio::spawn(connection::run(self.inner.clone(), epoch_rx, epoch));
    }

    /// Close the connection and cancel any pending reconnect or heartbeat.
    ///
    /// Synchronous: once this returns, the state is `Disconnected` and no
    /// timer from the old session will fire.
    pub fn disconnect(&self) {
        self.inner.epoch.send_modify(|epoch| *epoch += 1);
        self.inner.set_state(ConnectionState::Disconnected);
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner
            .state
            .lock()
            .map(|state| state.clone())
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    /// Queue a command for the wire. Dropped with a warning unless the
    /// connection is currently open.
    pub fn send(&self, command: ClientCommand) {
        if !self.is_connected() {
            warn!(?command, "dropping command; not connected");
            return;
        }
        match serde_json::to_string(&command) {
            Ok(frame) => {
                if self.inner.outbound_tx.send(frame).is_err() {
                    warn!("outbound channel closed");
                }
            }
            Err(err) => warn!(%err, "command serialization failed"),
        }
    }

    /// Ask the server to re-broadcast the current state of one claim.
    pub fn request_claim_update(&self, claim_id: &str) {
        self.send(ClientCommand::RequestClaimUpdate {
            claim_id: claim_id.to_string(),
        });
    }

    /// Ask the server to re-broadcast the current leaderboard.
    pub fn request_leaderboard_update(&self) {
        self.send(ClientCommand::RequestLeaderboardUpdate);
    }

    /// Register a handler for one event kind. Handlers run on the receive
    /// path, after the cache has been reconciled for the event.
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl Fn(&ServerEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.registry.subscribe(kind, handler)
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.inner.registry
    }

    pub fn cache(&self) -> &CacheStore {
        &self.inner.cache
    }

    /// The most recent well-formed envelope received on this connection.
    pub fn last_event(&self) -> Option<Envelope> {
        self.inner
            .last_event
            .lock()
            .map(|last| last.clone())
            .unwrap_or(None)
    }
}
