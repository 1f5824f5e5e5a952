//! Connection state machine and session driver.
//!
//! One driver task per `connect()` call owns the whole lifecycle: dialing,
//! the connected session (receive path, outbound forwarding, heartbeat),
//! and the fixed-interval bounded reconnection policy. `disconnect()` bumps
//! the client's session epoch; every suspension point in the driver also
//! waits on the epoch, so a local disconnect cancels pending reconnect and
//! heartbeat timers without any late callback firing afterwards.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use veristream_shared::{ClientCommand, Envelope, ErrorNotice, RealtimeError};

use crate::client::ClientInner;
use crate::config::LifecycleCallback;
use crate::transport::{InboundMessage, TransportSink, TransportStream};

/// Connection state of a [`crate::RealtimeClient`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting {
        attempt: u32,
    },
    Error {
        reason: String,
    },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. }
        )
    }
}

/// Driver task body. Returns when the session ends cleanly (local
/// disconnect), the reconnection budget is exhausted, or the client handle
/// is gone.
///
/// `epoch` is the session epoch this driver was spawned for. A
/// `disconnect()` bumps the epoch, so a later `connect()` spawns a fresh
/// driver that supersedes this one; a superseded driver exits without
/// touching the shared connection state. Every `select!` here is biased
/// with the epoch watcher first, so a disconnect that lands in the same
/// poll cycle as a ready timer, dial or frame always wins.
pub(crate) async fn run(inner: Arc<ClientInner>, mut epoch_rx: watch::Receiver<u64>, epoch: u64) {
    let mut attempt = 0u32;
    loop {
        let connected = tokio::select! {
            biased;
            _ = epoch_rx.changed() => {
                inner.release_driver(epoch);
                return;
            }
            res = inner.transport.connect(inner.config.url.as_str()) => res,
        };

        match connected {
            Ok((sink, stream)) => {
                attempt = 0;
                inner.set_state(ConnectionState::Connected);
                info!(url = %inner.config.url, "event stream connected");
                notify(&inner.config.on_connect);

                let clean = drive_session(&inner, sink, stream, &mut epoch_rx).await;
                notify(&inner.config.on_disconnect);
                if clean {
                    // A connect() issued after the disconnect may already
                    // own a newer driver; only the current one settles the
                    // state.
                    if inner.release_driver(epoch) {
                        inner.set_state(ConnectionState::Disconnected);
                    }
                    return;
                }
            }
            Err(err) => {
                warn!(url = %inner.config.url, %err, "connect attempt failed");
                inner.set_state(ConnectionState::Error {
                    reason: err.to_string(),
                });
                emit_error(&inner, &err);
            }
        }

        // Unclean close or failed dial: fixed-interval bounded retry.
        if attempt >= inner.config.max_reconnect_attempts {
            let exhausted = RealtimeError::ReconnectExhausted { attempts: attempt };
            warn!(%exhausted, "settling into disconnected; call connect() to retry");
            inner.set_state(ConnectionState::Disconnected);
            emit_error(&inner, &exhausted);
            inner.release_driver(epoch);
            return;
        }
        attempt += 1;
        inner.set_state(ConnectionState::Reconnecting { attempt });
        debug!(
            attempt,
            delay_ms = inner.config.reconnect_interval.as_millis() as u64,
            "reconnect scheduled"
        );
        tokio::select! {
            biased;
            _ = epoch_rx.changed() => {
                inner.release_driver(epoch);
                return;
            }
            _ = time::sleep(inner.config.reconnect_interval) => {}
        }
    }
}

/// Drive one connected session until it ends. Returns `true` for a clean
/// (locally initiated) close, `false` for peer closes and transport errors.
async fn drive_session(
    inner: &Arc<ClientInner>,
    mut sink: Box<dyn TransportSink>,
    mut stream: Box<dyn TransportStream>,
    epoch_rx: &mut watch::Receiver<u64>,
) -> bool {
    let mut outbound = inner.outbound_rx.lock().await;
    // Frames queued against a previous session are stale; drop them.
    while outbound.try_recv().is_ok() {}

    let period = inner.config.heartbeat_interval;
    let mut heartbeat = time::interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            biased;
            _ = epoch_rx.changed() => {
                // Close with a clean code so the close is never mistaken
                // for a peer-initiated one.
                if let Err(err) = sink.close().await {
                    debug!(%err, "close after disconnect failed");
                }
                return true;
            }
            inbound = stream.next_message() => match inbound {
                Some(Ok(InboundMessage::Text(text))) => handle_frame(inner, &text),
                Some(Ok(InboundMessage::Closed)) | None => {
                    info!("event stream closed by peer");
                    return false;
                }
                Some(Err(err)) => {
                    warn!(%err, "transport error");
                    inner.set_state(ConnectionState::Error {
                        reason: err.to_string(),
                    });
                    emit_error(inner, &err);
                    return false;
                }
            },
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(err) = sink.send_text(frame).await {
                        warn!(%err, "send failed");
                    }
                }
                // All senders gone means the client itself was dropped.
                None => return true,
            },
            _ = heartbeat.tick() => {
                if let Ok(ping) = serde_json::to_string(&ClientCommand::Ping) {
                    // Skip silently when the transport is not writable; the
                    // read side surfaces the close.
                    if let Err(err) = sink.send_text(ping).await {
                        debug!(%err, "heartbeat skipped");
                    }
                }
            }
        }
    }
}

/// Receive path: parse, reconcile the cache, then fan out to subscribers.
/// A malformed frame is dropped with a diagnostic and must never unwind.
fn handle_frame(inner: &ClientInner, text: &str) {
    match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => {
            debug!(kind = ?envelope.event.kind(), "event received");
            inner.cache.apply(&envelope.event);
            inner.registry.dispatch(&envelope.event);
            if let Ok(mut last) = inner.last_event.lock() {
                *last = Some(envelope);
            }
        }
        Err(err) => {
            let err = RealtimeError::Parse(err.to_string());
            warn!(%err, "dropping malformed event");
        }
    }
}

fn emit_error(inner: &ClientInner, err: &RealtimeError) {
    if let Some(on_error) = &inner.config.on_error {
        on_error(ErrorNotice::new(err.code(), err.to_string()));
    }
}

fn notify(callback: &Option<LifecycleCallback>) {
    if let Some(callback) = callback {
        callback();
    }
}
