//! Bounti Ledger - Append-only transaction journal
//!
//! The journal is the source of truth for audit and for later
//! "earnings from referral X" queries. It is:
//!
//! - Typed (every entry carries a closed category, never a free-text kind)
//! - Signed (credits positive, debits and recorded payments negative)
//! - Append-only (entries are never updated; the only destructive
//!   operation is the explicit admin purge of a whole category)
//! - Source-linked (the triggering account id is an explicit column;
//!   descriptions stay human-readable but are not authoritative)

use bounti_types::{AccountId, Amount, EntryId, Wallet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed category of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryCategory {
    /// Referral cash reward at a chain level
    ReferralCash { level: u8 },
    /// Referral palliative reward at a chain level
    ReferralPalliative { level: u8 },
    /// Referral cashback reward at a chain level
    ReferralCashback { level: u8 },
    /// Recipient half of a referral token reward at a chain level
    ReferralToken { level: u8 },
    /// Extended shelter-tier payout at a chain level
    ShelterReward { level: u8 },
    /// Renewal upkeep credit to the renewing member
    RenewalUpkeep { wallet: Wallet },
    /// Recorded membership activation payment
    MembershipActivation,
    /// Recorded membership renewal payment
    MembershipRenewal,
    /// Upgrade price difference debited from the member
    MembershipUpgrade,
    /// VAT-style tax recorded alongside a payment
    Vat,
    /// Pooled palliative balance moved into a selected wallet
    PalliativePoolTransfer,
    /// Empowerment activation fee paid by the sponsor
    EmpowermentFee,
    /// Empowerment funds released after approval
    EmpowermentRelease,
    /// Fallback protection paid to the sponsor
    EmpowermentFallback,
    /// Conversion cost drawn from the sponsor's main wallet
    EmpowermentConversion,
}

impl EntryCategory {
    /// Stable category code, e.g. `REFERRAL_CASH_L2`
    pub fn code(&self) -> String {
        match self {
            Self::ReferralCash { level } => format!("REFERRAL_CASH_L{level}"),
            Self::ReferralPalliative { level } => format!("REFERRAL_PALLIATIVE_L{level}"),
            Self::ReferralCashback { level } => format!("REFERRAL_CASHBACK_L{level}"),
            Self::ReferralToken { level } => format!("REFERRAL_TOKEN_L{level}"),
            Self::ShelterReward { level } => format!("SHELTER_REWARD_L{level}"),
            Self::RenewalUpkeep { wallet } => {
                format!("RENEWAL_{}", wallet.as_str().to_uppercase())
            }
            Self::MembershipActivation => "MEMBERSHIP_ACTIVATION".to_string(),
            Self::MembershipRenewal => "MEMBERSHIP_RENEWAL".to_string(),
            Self::MembershipUpgrade => "MEMBERSHIP_UPGRADE".to_string(),
            Self::Vat => "VAT".to_string(),
            Self::PalliativePoolTransfer => "PALLIATIVE_POOL_TRANSFER".to_string(),
            Self::EmpowermentFee => "EMPOWERMENT_FEE".to_string(),
            Self::EmpowermentRelease => "EMPOWERMENT_RELEASE".to_string(),
            Self::EmpowermentFallback => "EMPOWERMENT_FALLBACK".to_string(),
            Self::EmpowermentConversion => "EMPOWERMENT_CONVERSION".to_string(),
        }
    }
}

/// Status of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Completed,
}

/// A single journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub account: AccountId,
    pub category: EntryCategory,
    /// Signed amount: credits positive, debits negative
    pub amount: Amount,
    /// Human-readable description; carries the triggering account id for
    /// operators but is not parsed by anything
    pub description: String,
    /// The account whose trigger produced this entry
    pub source_account: Option<AccountId>,
    pub status: EntryStatus,
    /// Unique reference for reconciliation
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a completed entry with a fresh unique reference
    pub fn new(
        account: AccountId,
        category: EntryCategory,
        amount: Amount,
        description: impl Into<String>,
        source_account: Option<AccountId>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            account,
            category,
            amount,
            description: description.into(),
            source_account,
            status: EntryStatus::Completed,
            reference: format!("ref_{}", Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }
}

/// The append-only journal.
///
/// The journal owns no lock of its own: it is embedded in the store state
/// so that entry appends commit atomically with the wallet mutations they
/// describe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<LedgerEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Entries for one account, oldest first
    pub fn entries_for(&self, account: &AccountId) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| &e.account == account)
            .cloned()
            .collect()
    }

    /// Entries credited to `account` by triggers of `source`
    pub fn entries_from_source(&self, account: &AccountId, source: &AccountId) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| &e.account == account && e.source_account.as_ref() == Some(source))
            .cloned()
            .collect()
    }

    /// Total earnings credited to `account` by triggers of `source`
    pub fn earnings_from_source(&self, account: &AccountId, source: &AccountId) -> Amount {
        self.entries
            .iter()
            .filter(|e| {
                &e.account == account
                    && e.source_account.as_ref() == Some(source)
                    && e.amount.is_positive()
            })
            .map(|e| e.amount)
            .sum()
    }

    /// Signed total of all entries in a category
    pub fn category_total(&self, category: &EntryCategory) -> Amount {
        self.entries
            .iter()
            .filter(|e| &e.category == category)
            .map(|e| e.amount)
            .sum()
    }

    /// Entries matching a category code prefix, e.g. `REFERRAL_CASH`
    pub fn entries_with_code_prefix(&self, prefix: &str) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.category.code().starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Admin backfill support: delete every entry of a category en masse
    /// so the surrounding tooling can regenerate it. Returns the number
    /// of entries removed.
    pub fn purge_category(&mut self, category: &EntryCategory) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| &e.category != category);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        account: &AccountId,
        category: EntryCategory,
        amount: Amount,
        source: Option<&AccountId>,
    ) -> LedgerEntry {
        LedgerEntry::new(
            account.clone(),
            category,
            amount,
            format!("test credit from {:?}", source),
            source.cloned(),
        )
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(EntryCategory::ReferralCash { level: 2 }.code(), "REFERRAL_CASH_L2");
        assert_eq!(EntryCategory::Vat.code(), "VAT");
        assert_eq!(
            EntryCategory::RenewalUpkeep { wallet: Wallet::Health }.code(),
            "RENEWAL_HEALTH"
        );
    }

    #[test]
    fn test_earnings_from_source_uses_the_column() {
        let ancestor = AccountId::new();
        let activator = AccountId::new();
        let other = AccountId::new();

        let mut journal = Journal::new();
        journal.append(entry(
            &ancestor,
            EntryCategory::ReferralCash { level: 1 },
            Amount::from_major(450),
            Some(&activator),
        ));
        journal.append(entry(
            &ancestor,
            EntryCategory::ReferralCash { level: 1 },
            Amount::from_major(450),
            Some(&other),
        ));
        // Negative entries never count as earnings.
        journal.append(entry(
            &ancestor,
            EntryCategory::MembershipUpgrade,
            Amount::from_major(-100),
            Some(&activator),
        ));

        assert_eq!(
            journal.earnings_from_source(&ancestor, &activator),
            Amount::from_major(450)
        );
        assert_eq!(journal.entries_from_source(&ancestor, &activator).len(), 2);
    }

    #[test]
    fn test_purge_category_removes_only_that_category() {
        let account = AccountId::new();
        let mut journal = Journal::new();
        journal.append(entry(
            &account,
            EntryCategory::ReferralCash { level: 1 },
            Amount::from_major(10),
            None,
        ));
        journal.append(entry(
            &account,
            EntryCategory::ReferralCash { level: 2 },
            Amount::from_major(20),
            None,
        ));
        journal.append(entry(&account, EntryCategory::Vat, Amount::from_major(-5), None));

        let removed = journal.purge_category(&EntryCategory::ReferralCash { level: 1 });
        assert_eq!(removed, 1);
        assert_eq!(journal.len(), 2);
        assert_eq!(
            journal.category_total(&EntryCategory::ReferralCash { level: 2 }),
            Amount::from_major(20)
        );
    }

    #[test]
    fn test_unique_references() {
        let account = AccountId::new();
        let a = entry(&account, EntryCategory::Vat, Amount::zero(), None);
        let b = entry(&account, EntryCategory::Vat, Amount::zero(), None);
        assert_ne!(a.reference, b.reference);
    }
}
