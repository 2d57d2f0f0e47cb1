//! Append-only side records and the buy-back pool
//!
//! These records are written during reward distribution and read by admin
//! tooling; they are never updated in place.

use crate::{AccountId, Amount, PackageId, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shelter-tier payout, admin-visible only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelterReward {
    pub account: AccountId,
    /// Referral level (1..=10) that produced this payout
    pub level: u8,
    pub amount: Amount,
    /// The activating/renewing account that triggered the payout
    pub source_account: AccountId,
    pub created_at: DateTime<Utc>,
}

/// A renewal-history row summarizing one completed renewal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalRecord {
    pub account: AccountId,
    pub package: PackageId,
    /// 1-based renewal index for this account
    pub renewal_index: u32,
    /// Total value distributed to the referral chain by this renewal
    pub total_distributed: Amount,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// The singleton system account accumulating the non-user half of every
/// token reward, used to fund token repurchase and burns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyBackPool {
    pub balance: Amount,
    pub total_burned: Amount,
}

impl BuyBackPool {
    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Burn from the pool; fails if the pool balance is short
    pub fn burn(&mut self, amount: Amount) -> Result<()> {
        if amount > self.balance {
            return Err(crate::RewardError::InsufficientBalance {
                wallet: "buy_back_pool".to_string(),
                requested: amount.to_string(),
                available: self.balance.to_string(),
            });
        }
        self.balance = self.balance.checked_sub(amount)?;
        self.total_burned = self.total_burned.checked_add(amount)?;
        Ok(())
    }
}

/// A pre-checked admin authorization claim supplied by the caller.
///
/// The engine trusts the flag; verifying it is the calling layer's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaim {
    pub actor: AccountId,
    pub is_admin: bool,
}

impl AdminClaim {
    pub fn admin(actor: AccountId) -> Self {
        Self {
            actor,
            is_admin: true,
        }
    }

    pub fn member(actor: AccountId) -> Self {
        Self {
            actor,
            is_admin: false,
        }
    }

    /// Fail with `Unauthorized` unless the claim carries admin rights
    pub fn require_admin(&self, action: &'static str) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(crate::RewardError::Unauthorized { action })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RewardError;

    #[test]
    fn test_pool_burn_accounting() {
        let mut pool = BuyBackPool::default();
        pool.credit(Amount::from_major(100)).unwrap();
        pool.burn(Amount::from_major(30)).unwrap();

        assert_eq!(pool.balance, Amount::from_major(70));
        assert_eq!(pool.total_burned, Amount::from_major(30));

        let result = pool.burn(Amount::from_major(1_000));
        assert!(matches!(
            result,
            Err(RewardError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_admin_claim_gate() {
        let admin = AdminClaim::admin(AccountId::new());
        assert!(admin.require_admin("approve").is_ok());

        let member = AdminClaim::member(AccountId::new());
        assert!(matches!(
            member.require_admin("approve"),
            Err(RewardError::Unauthorized { .. })
        ));
    }
}
