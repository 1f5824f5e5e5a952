//! Claim cache: detail views, the "all claims" list projection, and
//! disputes-by-claim projections.
//!
//! The list projection is maintained by explicit rules (prepend on create,
//! map-and-replace on update), never rederived from detail entries. That
//! denormalization is deliberate and mirrors the platform's query cache.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use veristream_shared::{
    Claim, ClaimPatch, ClaimStatus, ClaimStatusChanged, Dispute, DisputePatch,
};

/// A cached claim read. `stale` means an invalidation has been recorded and
/// the caller should refetch before trusting the value.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRead {
    pub claim: Claim,
    pub stale: bool,
}

struct ClaimEntry {
    base: Claim,
    /// Locally applied patch awaiting server confirmation. Reads prefer
    /// this over `base`; any inbound reconciliation for the key clears it.
    optimistic: Option<Claim>,
}

#[derive(Default)]
struct ClaimsInner {
    details: HashMap<String, ClaimEntry>,
    list: Vec<Claim>,
    list_loaded: bool,
    disputes: HashMap<String, Vec<Dispute>>,
    stale_details: HashSet<String>,
    stale_disputes: HashSet<String>,
}

#[derive(Default)]
pub struct ClaimsStore {
    inner: RwLock<ClaimsInner>,
}

impl ClaimsStore {
    // --- Reads ---

    pub fn get(&self, claim_id: &str) -> Option<ClaimRead> {
        let inner = self.inner.read().ok()?;
        let entry = inner.details.get(claim_id)?;
        Some(ClaimRead {
            claim: entry.optimistic.clone().unwrap_or_else(|| entry.base.clone()),
            stale: inner.stale_details.contains(claim_id),
        })
    }

    pub fn detail_stale(&self, claim_id: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.stale_details.contains(claim_id))
            .unwrap_or(false)
    }

    /// The "all claims" list projection.
    pub fn list(&self) -> Vec<Claim> {
        self.inner
            .read()
            .map(|inner| inner.list.clone())
            .unwrap_or_default()
    }

    pub fn list_loaded(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.list_loaded)
            .unwrap_or(false)
    }

    pub fn disputes(&self, claim_id: &str) -> Option<Vec<Dispute>> {
        self.inner.read().ok()?.disputes.get(claim_id).cloned()
    }

    pub fn disputes_stale(&self, claim_id: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.stale_disputes.contains(claim_id))
            .unwrap_or(false)
    }

    // --- Seeding (fetched server truth pushed in by the query layer) ---

    pub fn seed_list(&self, claims: Vec<Claim>) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.list = claims;
        inner.list_loaded = true;
    }

    pub fn seed_detail(&self, claim: Claim) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.stale_details.remove(&claim.id);
        inner.details.insert(
            claim.id.clone(),
            ClaimEntry {
                base: claim,
                optimistic: None,
            },
        );
    }

    pub fn seed_disputes(&self, claim_id: &str, disputes: Vec<Dispute>) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.stale_disputes.remove(claim_id);
        inner.disputes.insert(claim_id.to_string(), disputes);
    }

    // --- Reconciliation ---

    /// CLAIM_CREATED: prepend to the list projection. Guarded by id so
    /// redelivery (at-least-once) leaves exactly one entry. No detail view
    /// is created; details are populated lazily on first read/fetch.
    pub(crate) fn apply_created(&self, claim: &Claim) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if inner.list.iter().any(|c| c.id == claim.id) {
            debug!(claim_id = %claim.id, "duplicate CLAIM_CREATED ignored");
            return;
        }
        inner.list.insert(0, claim.clone());
    }

    /// CLAIM_UPDATED: shallow-merge onto the detail entry (if cached) and
    /// the matching list element. Entries absent from cache stay absent.
    pub(crate) fn apply_patch(&self, claim_id: &str, patch: &ClaimPatch) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if let Some(entry) = inner.details.get_mut(claim_id) {
            patch.apply(&mut entry.base);
            // Server push confirms (and supersedes) any optimistic write.
            entry.optimistic = None;
        }
        for claim in inner.list.iter_mut() {
            if claim.id == claim_id {
                patch.apply(claim);
            }
        }
    }

    /// CLAIM_STATUS_CHANGED: a status-restricted patch, plus secondary
    /// invalidation when the claim enters DISPUTED.
    pub(crate) fn apply_status_change(&self, event: &ClaimStatusChanged) {
        let updated_at = event
            .claim
            .as_ref()
            .map(|c| c.updated_at)
            .unwrap_or_else(Utc::now);

        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if let Some(entry) = inner.details.get_mut(&event.claim_id) {
            entry.base.status = event.new_status;
            entry.base.updated_at = updated_at;
            entry.optimistic = None;
        }
        for claim in inner.list.iter_mut() {
            if claim.id == event.claim_id {
                claim.status = event.new_status;
            }
        }
        if event.new_status == ClaimStatus::Disputed {
            inner.stale_disputes.insert(event.claim_id.clone());
        }
    }

    /// DISPUTE_UPDATED: map-and-replace over cached dispute projections.
    pub(crate) fn apply_dispute_patch(&self, dispute_id: &str, patch: &DisputePatch) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        for disputes in inner.disputes.values_mut() {
            for dispute in disputes.iter_mut() {
                if dispute.id == dispute_id {
                    patch.apply(dispute);
                }
            }
        }
    }

    pub(crate) fn invalidate_detail(&self, claim_id: &str) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.stale_details.insert(claim_id.to_string());
    }

    pub(crate) fn invalidate_disputes(&self, claim_id: &str) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.stale_disputes.insert(claim_id.to_string());
    }

    // --- Optimistic writes ---

    /// Apply a local patch to the detail view only, ahead of server
    /// confirmation. The list projection is never optimistically touched.
    /// A claim with no cached detail is left alone.
    pub fn optimistic_update(&self, claim_id: &str, patch: &ClaimPatch) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        let Some(entry) = inner.details.get_mut(claim_id) else {
            debug!(claim_id, "optimistic update for uncached claim ignored");
            return;
        };
        let mut next = entry
            .optimistic
            .clone()
            .unwrap_or_else(|| entry.base.clone());
        patch.apply(&mut next);
        entry.optimistic = Some(next);
    }

    /// Discard the optimistic layer and mark the detail stale so the next
    /// read forces a refetch of server truth.
    pub fn rollback(&self, claim_id: &str) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if let Some(entry) = inner.details.get_mut(claim_id) {
            entry.optimistic = None;
        }
        inner.stale_details.insert(claim_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use veristream_shared::DisputeStatus;

    fn claim(id: &str, status: ClaimStatus) -> Claim {
        Claim {
            id: id.to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            claimant_address: "0xabc".to_string(),
            status,
            bounty_amount: 100.0,
            total_staked: 0.0,
            evidence: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn dispute(id: &str, claim_id: &str) -> Dispute {
        Dispute {
            id: id.to_string(),
            claim_id: claim_id.to_string(),
            reason: "suspect sourcing".to_string(),
            status: DisputeStatus::Open,
            pro_votes: 0,
            con_votes: 0,
            total_staked: 10.0,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn created_prepends_to_list() {
        let store = ClaimsStore::default();
        store.seed_list(vec![claim("c1", ClaimStatus::Open)]);

        store.apply_created(&claim("c2", ClaimStatus::Open));

        let ids: Vec<_> = store.list().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        // No lazy detail entry is created.
        assert!(store.get("c2").is_none());
    }

    #[test]
    fn created_twice_leaves_one_entry() {
        let store = ClaimsStore::default();
        let c = claim("c1", ClaimStatus::Open);
        store.apply_created(&c);
        store.apply_created(&c);

        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn patch_merges_into_detail_and_list() {
        let store = ClaimsStore::default();
        store.seed_detail(claim("c1", ClaimStatus::Open));
        store.seed_list(vec![claim("c1", ClaimStatus::Open)]);

        store.apply_patch("c1", &ClaimPatch::status(ClaimStatus::Verified));

        let read = store.get("c1").unwrap();
        assert_eq!(read.claim.status, ClaimStatus::Verified);
        assert_eq!(read.claim.title, "t");
        assert_eq!(store.list()[0].status, ClaimStatus::Verified);
    }

    #[test]
    fn patch_for_uncached_claim_is_ignored() {
        let store = ClaimsStore::default();
        store.apply_patch("ghost", &ClaimPatch::status(ClaimStatus::Verified));
        assert!(store.get("ghost").is_none());
        assert!(store.list().is_empty());
    }

    #[test]
    fn patch_is_idempotent() {
        let store = ClaimsStore::default();
        store.seed_detail(claim("c1", ClaimStatus::Open));
        let patch = ClaimPatch::status(ClaimStatus::Verified);

        store.apply_patch("c1", &patch);
        let once = store.get("c1").unwrap();
        store.apply_patch("c1", &patch);
        let twice = store.get("c1").unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn status_change_into_disputed_marks_dispute_list_stale() {
        let store = ClaimsStore::default();
        store.seed_detail(claim("c1", ClaimStatus::UnderReview));
        store.seed_disputes("c1", vec![dispute("d1", "c1")]);
        assert!(!store.disputes_stale("c1"));

        store.apply_status_change(&ClaimStatusChanged {
            claim_id: "c1".to_string(),
            previous_status: ClaimStatus::UnderReview,
            new_status: ClaimStatus::Disputed,
            claim: None,
        });

        assert_eq!(store.get("c1").unwrap().claim.status, ClaimStatus::Disputed);
        assert!(store.disputes_stale("c1"));
    }

    #[test]
    fn status_change_to_other_status_leaves_disputes_fresh() {
        let store = ClaimsStore::default();
        store.seed_detail(claim("c1", ClaimStatus::Open));
        store.seed_disputes("c1", Vec::new());

        store.apply_status_change(&ClaimStatusChanged {
            claim_id: "c1".to_string(),
            previous_status: ClaimStatus::Open,
            new_status: ClaimStatus::Verified,
            claim: None,
        });

        assert!(!store.disputes_stale("c1"));
    }

    #[test]
    fn dispute_patch_maps_over_cached_lists() {
        let store = ClaimsStore::default();
        store.seed_disputes("c1", vec![dispute("d1", "c1"), dispute("d2", "c1")]);

        store.apply_dispute_patch(
            "d2",
            &DisputePatch {
                status: Some(DisputeStatus::Voting),
                pro_votes: Some(3),
                ..DisputePatch::default()
            },
        );

        let disputes = store.disputes("c1").unwrap();
        assert_eq!(disputes[0].status, DisputeStatus::Open);
        assert_eq!(disputes[1].status, DisputeStatus::Voting);
        assert_eq!(disputes[1].pro_votes, 3);
    }

    #[test]
    fn invalidation_clears_on_reseed() {
        let store = ClaimsStore::default();
        store.seed_detail(claim("c1", ClaimStatus::Open));
        store.invalidate_detail("c1");
        assert!(store.get("c1").unwrap().stale);

        store.seed_detail(claim("c1", ClaimStatus::Verified));
        let read = store.get("c1").unwrap();
        assert!(!read.stale);
        assert_eq!(read.claim.status, ClaimStatus::Verified);
    }

    #[test]
    fn optimistic_update_is_visible_immediately_and_only_in_detail() {
        let store = ClaimsStore::default();
        store.seed_detail(claim("c1", ClaimStatus::Open));
        store.seed_list(vec![claim("c1", ClaimStatus::Open)]);

        store.optimistic_update("c1", &ClaimPatch::status(ClaimStatus::Disputed));

        assert_eq!(store.get("c1").unwrap().claim.status, ClaimStatus::Disputed);
        // The list projection never carries unconfirmed writes.
        assert_eq!(store.list()[0].status, ClaimStatus::Open);
    }

    #[test]
    fn rollback_discards_optimistic_layer_and_marks_stale() {
        let store = ClaimsStore::default();
        store.seed_detail(claim("c1", ClaimStatus::Open));
        store.optimistic_update("c1", &ClaimPatch::status(ClaimStatus::Disputed));

        store.rollback("c1");

        let read = store.get("c1").unwrap();
        assert_eq!(read.claim.status, ClaimStatus::Open);
        assert!(read.stale);
    }

    #[test]
    fn inbound_patch_confirms_and_replaces_optimistic_layer() {
        let store = ClaimsStore::default();
        store.seed_detail(claim("c1", ClaimStatus::Open));
        store.optimistic_update("c1", &ClaimPatch::status(ClaimStatus::Disputed));

        store.apply_patch("c1", &ClaimPatch::status(ClaimStatus::UnderReview));

        let read = store.get("c1").unwrap();
        assert_eq!(read.claim.status, ClaimStatus::UnderReview);
    }
}
