//! In-memory store
//!
//! Single `RwLock` over the whole state: commits serialize, and a commit
//! validates every op against cloned account state before swapping the
//! clones in, so a failing batch leaves the store untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bounti_ledger::{EntryCategory, Journal, LedgerEntry};
use bounti_types::{
    Account, AccountId, Amount, BuyBackPool, EmpowermentId, EmpowermentPackage,
    EmpowermentTransaction, PackageId, ReferralEdge, RenewalRecord, Result, RewardError,
    RewardPackage, ShelterReward,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{MembershipStore, StateOp, TriggerBatch};

#[derive(Default)]
struct StoreState {
    accounts: HashMap<AccountId, Account>,
    packages: HashMap<PackageId, RewardPackage>,
    /// Referral edges keyed by the referred account (one referrer each)
    edges: HashMap<AccountId, ReferralEdge>,
    empowerments: HashMap<EmpowermentId, EmpowermentPackage>,
    empowerment_audit: Vec<EmpowermentTransaction>,
    journal: Journal,
    shelter: Vec<ShelterReward>,
    renewals: Vec<RenewalRecord>,
    pool: BuyBackPool,
    /// Committed idempotency keys
    events: HashSet<String>,
}

/// Thread-safe in-memory implementation of [`MembershipStore`]
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration convenience: create an account and, when referred,
    /// its referral edge.
    pub async fn register(&self, referrer: Option<AccountId>) -> Account {
        let account = Account::new(referrer.clone());
        let mut state = self.state.write().await;
        if let Some(referrer) = referrer {
            state
                .edges
                .insert(account.id.clone(), ReferralEdge::new(referrer, account.id.clone()));
        }
        state.accounts.insert(account.id.clone(), account.clone());
        account
    }
}

#[async_trait::async_trait]
impl MembershipStore for InMemoryStore {
    async fn account(&self, id: &AccountId) -> Result<Account> {
        self.state
            .read()
            .await
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| RewardError::not_found("account", id))
    }

    async fn put_account(&self, account: Account) {
        self.state
            .write()
            .await
            .accounts
            .insert(account.id.clone(), account);
    }

    async fn package(&self, id: &PackageId) -> Result<RewardPackage> {
        self.state
            .read()
            .await
            .packages
            .get(id)
            .cloned()
            .ok_or_else(|| RewardError::not_found("package", id))
    }

    async fn put_package(&self, package: RewardPackage) {
        self.state
            .write()
            .await
            .packages
            .insert(package.id.clone(), package);
    }

    async fn add_edge(&self, edge: ReferralEdge) {
        self.state
            .write()
            .await
            .edges
            .insert(edge.referred.clone(), edge);
    }

    async fn referrer_of(&self, id: &AccountId) -> Result<Option<AccountId>> {
        let state = self.state.read().await;
        let edge = match state.edges.get(id) {
            Some(edge) if edge.is_active() => edge,
            _ => return Ok(None),
        };
        if !state.accounts.contains_key(&edge.referrer) {
            return Err(RewardError::data_integrity(format!(
                "referral edge {} points at missing account {}",
                edge.id, edge.referrer
            )));
        }
        Ok(Some(edge.referrer.clone()))
    }

    async fn empowerment(&self, id: &EmpowermentId) -> Result<EmpowermentPackage> {
        self.state
            .read()
            .await
            .empowerments
            .get(id)
            .cloned()
            .ok_or_else(|| RewardError::not_found("empowerment package", id))
    }

    async fn empowerment_audit(&self, id: &EmpowermentId) -> Vec<EmpowermentTransaction> {
        self.state
            .read()
            .await
            .empowerment_audit
            .iter()
            .filter(|t| &t.package == id)
            .cloned()
            .collect()
    }

    async fn buy_back_pool(&self) -> BuyBackPool {
        self.state.read().await.pool.clone()
    }

    async fn ledger_entries(&self, account: &AccountId) -> Vec<LedgerEntry> {
        self.state.read().await.journal.entries_for(account)
    }

    async fn earnings_from_source(&self, account: &AccountId, source: &AccountId) -> Amount {
        self.state
            .read()
            .await
            .journal
            .earnings_from_source(account, source)
    }

    async fn category_total(&self, category: &EntryCategory) -> Amount {
        self.state.read().await.journal.category_total(category)
    }

    async fn purge_category(&self, category: &EntryCategory) -> usize {
        self.state.write().await.journal.purge_category(category)
    }

    async fn shelter_rewards(&self, account: &AccountId) -> Vec<ShelterReward> {
        self.state
            .read()
            .await
            .shelter
            .iter()
            .filter(|s| &s.account == account)
            .cloned()
            .collect()
    }

    async fn renewal_history(&self, account: &AccountId) -> Vec<RenewalRecord> {
        self.state
            .read()
            .await
            .renewals
            .iter()
            .filter(|r| &r.account == account)
            .cloned()
            .collect()
    }

    async fn commit(&self, batch: TriggerBatch) -> Result<()> {
        let mut state = self.state.write().await;

        // Stage: clone every account the batch touches.
        let mut staged: HashMap<AccountId, Account> = HashMap::new();
        for op in &batch.ops {
            if let Some(id) = op.account_touched() {
                if !staged.contains_key(id) {
                    let account = state
                        .accounts
                        .get(id)
                        .cloned()
                        .ok_or_else(|| RewardError::not_found("account", id))?;
                    staged.insert(id.clone(), account);
                }
            }
        }
        let mut pool = state.pool.clone();

        let mut ledger_appends: Vec<LedgerEntry> = vec![];
        let mut shelter_appends: Vec<ShelterReward> = vec![];
        let mut renewal_appends: Vec<RenewalRecord> = vec![];
        let mut empowerment_puts: Vec<EmpowermentPackage> = vec![];
        let mut audit_appends: Vec<EmpowermentTransaction> = vec![];
        let mut new_events: Vec<String> = vec![];

        // Validate and apply against the staged clones.
        for op in batch.ops {
            match op {
                StateOp::Credit {
                    account,
                    wallet,
                    amount,
                } => {
                    staged
                        .get_mut(&account)
                        .ok_or_else(|| RewardError::not_found("account", &account))?
                        .credit(wallet, amount)?;
                }
                StateOp::Debit {
                    account,
                    wallet,
                    amount,
                } => {
                    staged
                        .get_mut(&account)
                        .ok_or_else(|| RewardError::not_found("account", &account))?
                        .debit(wallet, amount)?;
                }
                StateOp::CreditPool { amount } => pool.credit(amount)?,
                StateOp::BurnPool { amount } => pool.burn(amount)?,
                StateOp::Activate {
                    account,
                    package,
                    activated_at,
                    expires_at,
                } => {
                    let staged = staged
                        .get_mut(&account)
                        .ok_or_else(|| RewardError::not_found("account", &account))?;
                    staged.active_package = Some(package);
                    staged.activated_at = Some(activated_at);
                    staged.expires_at = Some(expires_at);
                }
                StateOp::SetPalliative {
                    account,
                    tier,
                    active,
                    selected,
                } => {
                    let staged = staged
                        .get_mut(&account)
                        .ok_or_else(|| RewardError::not_found("account", &account))?;
                    staged.palliative_tier = tier;
                    staged.palliative_active = active;
                    staged.selected_palliative = selected;
                }
                StateOp::RecordRenewal {
                    account,
                    expires_at,
                } => {
                    let staged = staged
                        .get_mut(&account)
                        .ok_or_else(|| RewardError::not_found("account", &account))?;
                    staged.renewal_count += 1;
                    staged.expires_at = Some(expires_at);
                }
                StateOp::SetActivePackage { account, package } => {
                    staged
                        .get_mut(&account)
                        .ok_or_else(|| RewardError::not_found("account", &account))?
                        .active_package = Some(package);
                }
                StateOp::Ledger(entry) => ledger_appends.push(entry),
                StateOp::Shelter(record) => shelter_appends.push(record),
                StateOp::RenewalHistory(record) => renewal_appends.push(record),
                StateOp::PutEmpowerment(package) => empowerment_puts.push(package),
                StateOp::EmpowermentAudit(tx) => audit_appends.push(tx),
                StateOp::UniqueEvent { key } => {
                    if state.events.contains(&key) || new_events.contains(&key) {
                        return Err(RewardError::DuplicateEvent { key });
                    }
                    new_events.push(key);
                }
            }
        }

        // Every op validated: swap the staged state in.
        let touched = staged.len();
        for (id, account) in staged {
            state.accounts.insert(id, account);
        }
        state.pool = pool;
        let appended = ledger_appends.len();
        for entry in ledger_appends {
            state.journal.append(entry);
        }
        state.shelter.extend(shelter_appends);
        state.renewals.extend(renewal_appends);
        for package in empowerment_puts {
            state.empowerments.insert(package.id.clone(), package);
        }
        state.empowerment_audit.extend(audit_appends);
        state.events.extend(new_events);

        debug!(
            label = batch.label,
            accounts = touched,
            ledger_entries = appended,
            "trigger batch committed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounti_types::Wallet;

    #[tokio::test]
    async fn commit_applies_credits_and_debits() {
        let store = InMemoryStore::new();
        let account = store.register(None).await;

        let mut batch = TriggerBatch::new("test");
        batch.credit(&account.id, Wallet::Main, Amount::from_major(100));
        batch.debit(&account.id, Wallet::Main, Amount::from_major(30));
        store.commit(batch).await.unwrap();

        let account = store.account(&account.id).await.unwrap();
        assert_eq!(account.balance(Wallet::Main), Amount::from_major(70));
    }

    #[tokio::test]
    async fn failed_debit_rolls_back_the_whole_batch() {
        let store = InMemoryStore::new();
        let a = store.register(None).await;
        let b = store.register(None).await;

        let mut batch = TriggerBatch::new("test");
        batch.credit(&a.id, Wallet::Main, Amount::from_major(500));
        // b has nothing; this debit must sink the entire batch.
        batch.debit(&b.id, Wallet::Main, Amount::from_major(1));

        let result = store.commit(batch).await;
        assert!(matches!(
            result,
            Err(RewardError::InsufficientBalance { .. })
        ));

        let a = store.account(&a.id).await.unwrap();
        assert_eq!(a.balance(Wallet::Main), Amount::zero());
    }

    #[tokio::test]
    async fn duplicate_event_key_is_rejected() {
        let store = InMemoryStore::new();
        let account = store.register(None).await;

        let mut batch = TriggerBatch::new("test");
        batch.credit(&account.id, Wallet::Main, Amount::from_major(10));
        batch.unique_event("activation:x");
        store.commit(batch).await.unwrap();

        let mut replay = TriggerBatch::new("test");
        replay.credit(&account.id, Wallet::Main, Amount::from_major(10));
        replay.unique_event("activation:x");
        let result = store.commit(replay).await;

        assert!(matches!(result, Err(RewardError::DuplicateEvent { .. })));
        let account = store.account(&account.id).await.unwrap();
        // The replayed credit was not applied.
        assert_eq!(account.balance(Wallet::Main), Amount::from_major(10));
    }

    #[tokio::test]
    async fn referrer_walk_flags_orphaned_edges() {
        let store = InMemoryStore::new();
        let referred = store.register(None).await;
        let ghost = AccountId::new();
        store
            .add_edge(ReferralEdge::new(ghost, referred.id.clone()))
            .await;

        let result = store.referrer_of(&referred.id).await;
        assert!(matches!(
            result,
            Err(RewardError::DataIntegrityError { .. })
        ));
    }

    #[tokio::test]
    async fn inactive_edge_ends_the_walk() {
        let store = InMemoryStore::new();
        let referrer = store.register(None).await;
        let referred = store.register(None).await;
        let mut edge = ReferralEdge::new(referrer.id.clone(), referred.id.clone());
        edge.status = bounti_types::EdgeStatus::Inactive;
        store.add_edge(edge).await;

        assert_eq!(store.referrer_of(&referred.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn pool_ops_round_trip() {
        let store = InMemoryStore::new();
        let mut batch = TriggerBatch::new("test");
        batch.push(StateOp::CreditPool {
            amount: Amount::from_major(50),
        });
        batch.push(StateOp::BurnPool {
            amount: Amount::from_major(20),
        });
        store.commit(batch).await.unwrap();

        let pool = store.buy_back_pool().await;
        assert_eq!(pool.balance, Amount::from_major(30));
        assert_eq!(pool.total_burned, Amount::from_major(20));
    }
}
