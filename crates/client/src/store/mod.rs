//! Cache store: keyed in-memory state reconciled against the event stream.
//!
//! Mutation is confined to the single-threaded dispatch path (reconciliation)
//! plus the optimistic-write/rollback path; reads are safe from any thread.
//! Events for the same key apply in receipt order. Applying an event twice
//! leaves the cache unchanged (at-least-once delivery contract).

mod claims;
mod leaderboard;

pub use claims::{ClaimRead, ClaimsStore};
pub use leaderboard::LeaderboardStore;

use veristream_shared::ServerEvent;

/// The shared cache behind a [`crate::RealtimeClient`].
#[derive(Default)]
pub struct CacheStore {
    claims: ClaimsStore,
    leaderboard: LeaderboardStore,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claims(&self) -> &ClaimsStore {
        &self.claims
    }

    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.leaderboard
    }

    /// Apply one reconciliation rule for the given event kind.
    pub fn apply(&self, event: &ServerEvent) {
        match event {
            ServerEvent::ClaimCreated(p) => self.claims.apply_created(&p.claim),
            ServerEvent::ClaimUpdated(p) => self.claims.apply_patch(&p.claim_id, &p.updates),
            ServerEvent::ClaimStatusChanged(p) => self.claims.apply_status_change(p),
            ServerEvent::VerificationAdded(p) => {
                self.claims.invalidate_detail(&p.claim_id);
                self.leaderboard
                    .invalidate_user(&p.verification.verifier_address);
            }
            ServerEvent::VerificationUpdated(p) => self.claims.invalidate_detail(&p.claim_id),
            ServerEvent::DisputeCreated(p) => self.claims.invalidate_detail(&p.claim_id),
            ServerEvent::DisputeUpdated(p) => {
                self.claims.apply_dispute_patch(&p.dispute_id, &p.updates)
            }
            ServerEvent::DisputeResolved(p) => {
                self.claims.invalidate_detail(&p.claim_id);
                self.claims.invalidate_disputes(&p.claim_id);
            }
            ServerEvent::LeaderboardUpdated(p) => {
                self.leaderboard.replace_rankings(p.rankings.clone())
            }
            ServerEvent::UserStatsUpdated(stats) => self.leaderboard.apply_user_stats(stats.clone()),
            // Connection metadata and stream errors carry no cache effect.
            ServerEvent::ConnectionStatus(_) | ServerEvent::Error(_) => {}
        }
    }
}
