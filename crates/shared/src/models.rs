//! Domain models for the claims-verification platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Claims ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Open,
    UnderReview,
    Verified,
    Rejected,
    Disputed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceType {
    Link,
    Text,
    Image,
    Video,
    Document,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: EvidenceType,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub title: String,
    pub description: String,
    pub claimant_address: String,
    pub status: ClaimStatus,
    pub bounty_amount: f64,
    pub total_staked: f64,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a [`Claim`]. Fields left `None` are untouched by
/// [`ClaimPatch::apply`], mirroring a shallow `{ ...old, ...updates }` merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClaimStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounty_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_staked: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<Evidence>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClaimPatch {
    pub fn apply(&self, claim: &mut Claim) {
        if let Some(title) = &self.title {
            claim.title = title.clone();
        }
        if let Some(description) = &self.description {
            claim.description = description.clone();
        }
        if let Some(status) = self.status {
            claim.status = status;
        }
        if let Some(bounty_amount) = self.bounty_amount {
            claim.bounty_amount = bounty_amount;
        }
        if let Some(total_staked) = self.total_staked {
            claim.total_staked = total_staked;
        }
        if let Some(evidence) = &self.evidence {
            claim.evidence = evidence.clone();
        }
        if let Some(updated_at) = self.updated_at {
            claim.updated_at = updated_at;
        }
    }

    pub fn status(status: ClaimStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

// --- Verifications ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationDecision {
    Verify,
    Reject,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub id: String,
    pub claim_id: String,
    pub verifier_address: String,
    pub decision: VerificationDecision,
    pub stake_amount: f64,
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<VerificationDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VerificationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl VerificationPatch {
    pub fn apply(&self, verification: &mut Verification) {
        if let Some(decision) = self.decision {
            verification.decision = decision;
        }
        if let Some(stake_amount) = self.stake_amount {
            verification.stake_amount = stake_amount;
        }
        if let Some(status) = self.status {
            verification.status = status;
        }
        if let Some(transaction_hash) = &self.transaction_hash {
            verification.transaction_hash = Some(transaction_hash.clone());
        }
        if let Some(confirmed_at) = self.confirmed_at {
            verification.confirmed_at = Some(confirmed_at);
        }
    }
}

// --- Disputes ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    Open,
    Voting,
    Resolved,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: String,
    pub claim_id: String,
    pub reason: String,
    pub status: DisputeStatus,
    pub pro_votes: u64,
    pub con_votes: u64,
    pub total_staked: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DisputePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DisputeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pro_votes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub con_votes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_staked: Option<f64>,
}

impl DisputePatch {
    pub fn apply(&self, dispute: &mut Dispute) {
        if let Some(reason) = &self.reason {
            dispute.reason = reason.clone();
        }
        if let Some(status) = self.status {
            dispute.status = status;
        }
        if let Some(pro_votes) = self.pro_votes {
            dispute.pro_votes = pro_votes;
        }
        if let Some(con_votes) = self.con_votes {
            dispute.con_votes = con_votes;
        }
        if let Some(total_staked) = self.total_staked {
            dispute.total_staked = total_staked;
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeOutcome {
    Upheld,
    Overturned,
}

// --- Leaderboard ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub username: String,
    pub total_verifications: u64,
    pub accuracy: f64,
    pub total_staked: f64,
    pub total_earned: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub verification_count: u64,
    pub accuracy: f64,
    pub reputation: f64,
    pub total_staked: f64,
    pub total_earned: f64,
}
