//! Referral edges
//!
//! A directed edge from referrer to referred, created once at registration.
//! Edges form a forest; the chain resolver still caps traversal depth and
//! refuses repeated ids defensively.

use crate::AccountId;
use crate::EdgeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a referral edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeStatus {
    Active,
    Inactive,
}

/// A directed referral edge (referrer -> referred)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralEdge {
    pub id: EdgeId,
    pub referrer: AccountId,
    pub referred: AccountId,
    pub status: EdgeStatus,
    /// Reserved for future use
    pub reward_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl ReferralEdge {
    /// Create a new active edge
    pub fn new(referrer: AccountId, referred: AccountId) -> Self {
        Self {
            id: EdgeId::new(),
            referrer,
            referred,
            status: EdgeStatus::Active,
            reward_paid: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EdgeStatus::Active
    }
}
