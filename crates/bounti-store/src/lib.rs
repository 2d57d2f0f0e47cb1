//! Bounti Store - Persistence seam for the rewards core
//!
//! The engine never mutates state directly. Each trigger computes its
//! complete effect as a [`TriggerBatch`] of [`StateOp`]s and submits it
//! through [`MembershipStore::commit`], which applies the whole batch or
//! nothing. Reads go through repository-style methods keyed by opaque ids.
//!
//! # Invariants
//!
//! 1. A failed commit leaves no partial state behind
//! 2. Concurrent triggers serialize at the commit boundary
//! 3. Wallet balances never go negative
//! 4. Idempotency keys are unique across all committed triggers

mod batch;
mod memory;

pub use batch::{StateOp, TriggerBatch};
pub use memory::InMemoryStore;

use bounti_ledger::{EntryCategory, LedgerEntry};
use bounti_types::{
    Account, AccountId, Amount, BuyBackPool, EmpowermentId, EmpowermentPackage,
    EmpowermentTransaction, PackageId, ReferralEdge, RenewalRecord, Result, RewardPackage,
    ShelterReward,
};

/// Transactional repository for every entity the rewards core touches.
///
/// `commit` is the single mutation path for triggers; the `put_*` methods
/// exist for registration and admin tooling.
#[async_trait::async_trait]
pub trait MembershipStore: Send + Sync {
    // ------------------------------------------------------------------
    // Accounts & packages
    // ------------------------------------------------------------------

    async fn account(&self, id: &AccountId) -> Result<Account>;
    async fn put_account(&self, account: Account);

    async fn package(&self, id: &PackageId) -> Result<RewardPackage>;
    async fn put_package(&self, package: RewardPackage);

    // ------------------------------------------------------------------
    // Referral edges
    // ------------------------------------------------------------------

    async fn add_edge(&self, edge: ReferralEdge);

    /// The direct referrer of an account, walking its active edge.
    ///
    /// Returns `Ok(None)` when the account has no edge or the edge is
    /// inactive; fails with `DataIntegrityError` when the edge points at
    /// an account that does not exist.
    async fn referrer_of(&self, id: &AccountId) -> Result<Option<AccountId>>;

    // ------------------------------------------------------------------
    // Empowerment packages
    // ------------------------------------------------------------------

    async fn empowerment(&self, id: &EmpowermentId) -> Result<EmpowermentPackage>;
    async fn empowerment_audit(&self, id: &EmpowermentId) -> Vec<EmpowermentTransaction>;

    // ------------------------------------------------------------------
    // Pool, journal, and side records
    // ------------------------------------------------------------------

    async fn buy_back_pool(&self) -> BuyBackPool;

    async fn ledger_entries(&self, account: &AccountId) -> Vec<LedgerEntry>;
    async fn earnings_from_source(&self, account: &AccountId, source: &AccountId) -> Amount;
    async fn category_total(&self, category: &EntryCategory) -> Amount;

    /// Admin backfill support: delete a whole category en masse.
    async fn purge_category(&self, category: &EntryCategory) -> usize;

    async fn shelter_rewards(&self, account: &AccountId) -> Vec<ShelterReward>;
    async fn renewal_history(&self, account: &AccountId) -> Vec<RenewalRecord>;

    // ------------------------------------------------------------------
    // The mutation path
    // ------------------------------------------------------------------

    /// Apply a trigger batch atomically.
    ///
    /// Every debit is validated against current balances and every
    /// idempotency key against committed history before anything is
    /// applied; on any failure the store is untouched and the typed error
    /// propagates to the trigger's caller.
    async fn commit(&self, batch: TriggerBatch) -> Result<()>;
}
