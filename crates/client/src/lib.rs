//! Veristream client - realtime synchronization core.
//!
//! A persistent WebSocket client for the claims-verification platform:
//! connection management with heartbeat and bounded reconnection, a typed
//! per-event-kind subscriber registry, and a reconciled in-memory cache of
//! claims, disputes, leaderboard, and user stats.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 RealtimeClient                   │
//! │  connect / disconnect / send / subscribe / cache │
//! └──────────────────────────────────────────────────┘
//!            │                │               │
//!            ▼                ▼               ▼
//!     ┌────────────┐   ┌─────────────┐  ┌────────────┐
//!     │ connection │   │ EventRegistry│  │ CacheStore │
//!     │ (driver)   │──▶│ (fan-out)   │  │ (reconcile)│
//!     └────────────┘   └─────────────┘  └────────────┘
//!            │
//!            ▼
//!     ┌────────────┐
//!     │ Transport  │  (tokio-tungstenite; mockable seam)
//!     └────────────┘
//! ```
//!
//! Consumers read from the [`store::CacheStore`] and call
//! [`RealtimeClient::subscribe`] for push notifications. The receive path
//! reconciles the cache before invoking subscribers, so a handler always
//! observes the post-event cache state.

pub mod client;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod store;
pub mod transport;

pub use client::RealtimeClient;
pub use config::ClientConfig;
pub use connection::ConnectionState;
pub use dispatch::{EventRegistry, Subscription};
pub use store::{CacheStore, ClaimRead, ClaimsStore, LeaderboardStore};
pub use transport::{Transport, WsTransport};

pub use veristream_shared as shared;
pub use veristream_shared::{ClientCommand, Envelope, EventKind, RealtimeError, ServerEvent};
