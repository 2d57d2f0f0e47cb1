//! Trigger batches: the unit of atomic state change
//!
//! A trigger (activation, renewal, upgrade, lifecycle transition) never
//! mutates the store piecemeal. It builds one `TriggerBatch` describing
//! every wallet movement, ledger append, and field update, then commits it
//! as a whole. Credits are expressed as increments so batches from
//! overlapping referral chains compose under serialization.

use bounti_ledger::LedgerEntry;
use bounti_types::{
    AccountId, Amount, EmpowermentPackage, EmpowermentTransaction, PackageId, PalliativeTier,
    PalliativeType, RenewalRecord, ShelterReward, Wallet,
};
use chrono::{DateTime, Utc};

/// One state change inside a trigger batch
#[derive(Debug, Clone)]
pub enum StateOp {
    /// Increment a wallet balance
    Credit {
        account: AccountId,
        wallet: Wallet,
        amount: Amount,
    },
    /// Decrement a wallet balance; validated against the current balance
    Debit {
        account: AccountId,
        wallet: Wallet,
        amount: Amount,
    },
    /// Credit the buy-back pool
    CreditPool { amount: Amount },
    /// Burn from the buy-back pool
    BurnPool { amount: Amount },
    /// Set the activation fields after a first activation or conversion
    Activate {
        account: AccountId,
        package: PackageId,
        activated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
    /// Set the palliative routing fields
    SetPalliative {
        account: AccountId,
        tier: Option<PalliativeTier>,
        active: bool,
        selected: Option<PalliativeType>,
    },
    /// Record a completed renewal: bump the counter, move the expiry
    RecordRenewal {
        account: AccountId,
        expires_at: DateTime<Utc>,
    },
    /// Switch the active package on upgrade
    SetActivePackage {
        account: AccountId,
        package: PackageId,
    },
    /// Append a journal entry
    Ledger(LedgerEntry),
    /// Append a shelter payout record
    Shelter(ShelterReward),
    /// Append a renewal-history record
    RenewalHistory(RenewalRecord),
    /// Insert or replace an empowerment package
    PutEmpowerment(EmpowermentPackage),
    /// Append an empowerment audit row
    EmpowermentAudit(EmpowermentTransaction),
    /// Idempotency key; the commit fails if the key was already recorded
    UniqueEvent { key: String },
}

impl StateOp {
    /// The account this op mutates, if any
    pub fn account_touched(&self) -> Option<&AccountId> {
        match self {
            StateOp::Credit { account, .. }
            | StateOp::Debit { account, .. }
            | StateOp::Activate { account, .. }
            | StateOp::SetPalliative { account, .. }
            | StateOp::RecordRenewal { account, .. }
            | StateOp::SetActivePackage { account, .. } => Some(account),
            _ => None,
        }
    }
}

/// An ordered, all-or-nothing collection of state ops
#[derive(Debug, Clone, Default)]
pub struct TriggerBatch {
    /// Short label for logs, e.g. `activation`
    pub label: &'static str,
    pub ops: Vec<StateOp>,
}

impl TriggerBatch {
    pub fn new(label: &'static str) -> Self {
        Self { label, ops: vec![] }
    }

    pub fn push(&mut self, op: StateOp) {
        self.ops.push(op);
    }

    /// Push a credit, dropping zero amounts
    pub fn credit(&mut self, account: &AccountId, wallet: Wallet, amount: Amount) {
        if amount.is_positive() {
            self.push(StateOp::Credit {
                account: account.clone(),
                wallet,
                amount,
            });
        }
    }

    /// Push a debit
    pub fn debit(&mut self, account: &AccountId, wallet: Wallet, amount: Amount) {
        self.push(StateOp::Debit {
            account: account.clone(),
            wallet,
            amount,
        });
    }

    pub fn ledger(&mut self, entry: LedgerEntry) {
        self.push(StateOp::Ledger(entry));
    }

    pub fn unique_event(&mut self, key: impl Into<String>) {
        self.push(StateOp::UniqueEvent { key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
