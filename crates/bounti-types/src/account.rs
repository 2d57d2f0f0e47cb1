//! Member account entity
//!
//! Accounts are created at registration and never deleted. Balances are
//! mutated only through the engine's commit path.

use crate::{
    AccountId, Amount, PackageId, PalliativeTier, PalliativeType, Result, RewardError, Wallet,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A member account with its named balances and referral linkage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account ID
    pub id: AccountId,
    /// Direct referrer, set once at registration
    pub referrer: Option<AccountId>,
    /// Balances by wallet; absent wallets read as zero
    pub balances: HashMap<Wallet, Amount>,
    /// Currently active package, if any
    pub active_package: Option<PackageId>,
    /// When the active package was activated
    pub activated_at: Option<DateTime<Utc>>,
    /// When the active package expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Palliative tier derived from the package price tier
    pub palliative_tier: Option<PalliativeTier>,
    /// Whether the member has activated palliative selection
    pub palliative_active: bool,
    /// Selected palliative type, if activated
    pub selected_palliative: Option<PalliativeType>,
    /// Number of completed renewals
    pub renewal_count: u32,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account, optionally linked to a referrer
    pub fn new(referrer: Option<AccountId>) -> Self {
        Self {
            id: AccountId::new(),
            referrer,
            balances: HashMap::new(),
            active_package: None,
            activated_at: None,
            expires_at: None,
            palliative_tier: None,
            palliative_active: false,
            selected_palliative: None,
            renewal_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Get the balance of a wallet
    pub fn balance(&self, wallet: Wallet) -> Amount {
        self.balances.get(&wallet).copied().unwrap_or_default()
    }

    /// Credit a wallet
    pub fn credit(&mut self, wallet: Wallet, amount: Amount) -> Result<()> {
        let new_balance = self.balance(wallet).checked_add(amount)?;
        self.balances.insert(wallet, new_balance);
        Ok(())
    }

    /// Debit a wallet; the balance never goes negative
    pub fn debit(&mut self, wallet: Wallet, amount: Amount) -> Result<()> {
        let current = self.balance(wallet);
        if amount > current {
            return Err(RewardError::InsufficientBalance {
                wallet: wallet.as_str().to_string(),
                requested: amount.to_string(),
                available: current.to_string(),
            });
        }
        self.balances.insert(wallet, current.checked_sub(amount)?);
        Ok(())
    }

    /// Whether the account holds a package that has not expired at `now`
    pub fn has_active_package(&self, now: DateTime<Utc>) -> bool {
        match (&self.active_package, self.expires_at) {
            (Some(_), Some(expires_at)) => now < expires_at,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_credit_and_debit() {
        let mut account = Account::new(None);
        account.credit(Wallet::Main, Amount::from_major(100)).unwrap();
        assert_eq!(account.balance(Wallet::Main), Amount::from_major(100));

        account.debit(Wallet::Main, Amount::from_major(40)).unwrap();
        assert_eq!(account.balance(Wallet::Main), Amount::from_major(60));
    }

    #[test]
    fn test_debit_cannot_go_negative() {
        let mut account = Account::new(None);
        account.credit(Wallet::Main, Amount::from_major(10)).unwrap();

        let result = account.debit(Wallet::Main, Amount::from_major(20));
        assert!(matches!(
            result,
            Err(RewardError::InsufficientBalance { .. })
        ));
        // Failed debit leaves the balance untouched.
        assert_eq!(account.balance(Wallet::Main), Amount::from_major(10));
    }

    #[test]
    fn test_active_package_window() {
        let mut account = Account::new(None);
        assert!(!account.has_active_package(Utc::now()));

        account.active_package = Some(PackageId::new());
        account.expires_at = Some(Utc::now() + Duration::days(10));
        assert!(account.has_active_package(Utc::now()));
        assert!(!account.has_active_package(Utc::now() + Duration::days(11)));
    }
}
