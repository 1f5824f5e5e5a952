//! Client configuration.

use std::sync::Arc;
use std::time::Duration;

use url::Url;
use veristream_shared::ErrorNotice;

/// Maximum reconnect attempts after an unclean close.
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 5;
/// Fixed delay between reconnect attempts. Deliberately not exponential;
/// see DESIGN.md before changing.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3000);
/// Interval between heartbeat PING frames while connected.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(30000);

pub type LifecycleCallback = Arc<dyn Fn() + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(ErrorNotice) + Send + Sync>;

/// Configuration for a [`crate::RealtimeClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Event stream endpoint (`ws://` or `wss://`).
    pub url: Url,
    /// Reconnect attempts before settling into `Disconnected` (0 disables
    /// reconnection entirely).
    pub max_reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts.
    pub reconnect_interval: Duration,
    /// Heartbeat cadence while connected.
    pub heartbeat_interval: Duration,
    /// Invoked on every successful transport open.
    pub on_connect: Option<LifecycleCallback>,
    /// Invoked on every transport close, clean or not.
    pub on_disconnect: Option<LifecycleCallback>,
    /// Invoked with a structured notice on transport errors, parse-and-drop
    /// diagnostics stay at log level only.
    pub on_error: Option<ErrorCallback>,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            max_reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            on_connect: None,
            on_disconnect: None,
            on_error: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url.as_str())
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .field("reconnect_interval", &self.reconnect_interval)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .finish_non_exhaustive()
    }
}
