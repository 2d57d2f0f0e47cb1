//! BPT split service
//!
//! Every token reward is split between the recipient's token wallet and
//! the system buy-back pool. The split conserves value exactly; when the
//! gross amount is odd in the smallest unit the extra unit goes to the
//! pool. Only the recipient's half is user-visible in the journal.

use bounti_ledger::{EntryCategory, LedgerEntry};
use bounti_store::TriggerBatch;
use bounti_types::{AccountId, Amount, Wallet};

/// The two sides of a token split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSplit {
    pub recipient_share: Amount,
    pub pool_share: Amount,
}

/// Split a gross token amount 50/50 with exact conservation
pub fn split_token(gross: Amount) -> TokenSplit {
    let (recipient_share, pool_share) = gross.split_half();
    TokenSplit {
        recipient_share,
        pool_share,
    }
}

/// Push the ops for one token reward onto a trigger batch.
///
/// Credits the recipient's token wallet and the buy-back pool, and writes
/// one ledger entry for the recipient's half only; pool-side accounting
/// stays internal.
pub fn push_token_ops(
    batch: &mut TriggerBatch,
    recipient: &AccountId,
    gross: Amount,
    category: EntryCategory,
    description: String,
    source: &AccountId,
) -> TokenSplit {
    let split = split_token(gross);
    if split.recipient_share.is_positive() {
        batch.credit(recipient, Wallet::Token, split.recipient_share);
    }
    if split.pool_share.is_positive() {
        batch.push(bounti_store::StateOp::CreditPool {
            amount: split.pool_share,
        });
    }
    if split.recipient_share.is_positive() {
        batch.ledger(LedgerEntry::new(
            recipient.clone(),
            category,
            split.recipient_share,
            description,
            Some(source.clone()),
        ));
    }
    split
}
