//! Wire protocol for the realtime event stream.
//!
//! Every inbound message is an [`Envelope`]: a `type` tag from a closed set,
//! a type-specific `payload`, and an ISO-8601 `timestamp`. Outbound control
//! messages ([`ClientCommand`]) carry no envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Claim, ClaimPatch, ClaimStatus, Dispute, DisputeOutcome, DisputePatch, LeaderboardEntry,
    UserStats, Verification, VerificationPatch,
};

/// Typed wrapper around every inbound realtime message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(flatten)]
    pub event: ServerEvent,
    pub timestamp: DateTime<Utc>,
}

/// The closed set of server-pushed events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    ClaimCreated(ClaimCreated),
    ClaimUpdated(ClaimUpdated),
    ClaimStatusChanged(ClaimStatusChanged),
    VerificationAdded(VerificationAdded),
    VerificationUpdated(VerificationUpdated),
    DisputeCreated(DisputeCreated),
    DisputeUpdated(DisputeUpdated),
    DisputeResolved(DisputeResolved),
    LeaderboardUpdated(LeaderboardUpdated),
    UserStatsUpdated(UserStats),
    ConnectionStatus(ConnectionStatus),
    Error(ErrorNotice),
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::ClaimCreated(_) => EventKind::ClaimCreated,
            ServerEvent::ClaimUpdated(_) => EventKind::ClaimUpdated,
            ServerEvent::ClaimStatusChanged(_) => EventKind::ClaimStatusChanged,
            ServerEvent::VerificationAdded(_) => EventKind::VerificationAdded,
            ServerEvent::VerificationUpdated(_) => EventKind::VerificationUpdated,
            ServerEvent::DisputeCreated(_) => EventKind::DisputeCreated,
            ServerEvent::DisputeUpdated(_) => EventKind::DisputeUpdated,
            ServerEvent::DisputeResolved(_) => EventKind::DisputeResolved,
            ServerEvent::LeaderboardUpdated(_) => EventKind::LeaderboardUpdated,
            ServerEvent::UserStatsUpdated(_) => EventKind::UserStatsUpdated,
            ServerEvent::ConnectionStatus(_) => EventKind::ConnectionStatus,
            ServerEvent::Error(_) => EventKind::Error,
        }
    }
}

/// Discriminant of [`ServerEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ClaimCreated,
    ClaimUpdated,
    ClaimStatusChanged,
    VerificationAdded,
    VerificationUpdated,
    DisputeCreated,
    DisputeUpdated,
    DisputeResolved,
    LeaderboardUpdated,
    UserStatsUpdated,
    ConnectionStatus,
    Error,
}

// --- Event payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimCreated {
    pub claim: Claim,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimUpdated {
    pub claim_id: String,
    pub updates: ClaimPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatusChanged {
    pub claim_id: String,
    pub previous_status: ClaimStatus,
    pub new_status: ClaimStatus,
    /// Fresh claim snapshot, when the server includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<Claim>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationAdded {
    pub verification: Verification,
    pub claim_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationUpdated {
    pub verification_id: String,
    pub claim_id: String,
    pub updates: VerificationPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisputeCreated {
    pub dispute: Dispute,
    pub claim_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisputeUpdated {
    pub dispute_id: String,
    pub updates: DisputePatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisputeResolved {
    pub dispute_id: String,
    pub claim_id: String,
    pub outcome: DisputeOutcome,
    pub winning_votes: u64,
    pub losing_votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardUpdated {
    pub rankings: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Connected,
    Disconnected,
    Reconnecting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub status: StreamStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_connected: Option<DateTime<Utc>>,
}

/// Structured error, both as a server-pushed event and as the payload
/// handed to the configured error callback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNotice {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorNotice {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

// --- Outbound control messages ---

/// Client-to-server control messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCommand {
    Ping,
    #[serde(rename_all = "camelCase")]
    RequestClaimUpdate {
        claim_id: String,
    },
    RequestLeaderboardUpdate,
}
