//! Referral chain resolver
//!
//! Level-order walk up the referral forest: the direct referrer first,
//! then the referrer's referrer, up to the configured depth. Trees are
//! acyclic by construction, but the walk still keeps a seen-set and
//! surfaces a repeat as a data-integrity error instead of looping.

use std::collections::HashSet;

use bounti_store::MembershipStore;
use bounti_types::{AccountId, Result, RewardError};

/// Resolve the ordered ancestor chain of an account.
///
/// Index 0 is level 1 (the nearest ancestor). The result is never longer
/// than `max_depth` and contains no repeated ids. Pure read.
pub async fn referral_chain(
    store: &dyn MembershipStore,
    start: &AccountId,
    max_depth: usize,
) -> Result<Vec<AccountId>> {
    let mut chain = Vec::with_capacity(max_depth);
    let mut seen: HashSet<AccountId> = HashSet::new();
    seen.insert(start.clone());

    let mut current = start.clone();
    while chain.len() < max_depth {
        match store.referrer_of(&current).await? {
            Some(ancestor) => {
                if !seen.insert(ancestor.clone()) {
                    return Err(RewardError::data_integrity(format!(
                        "referral chain revisits account {ancestor}"
                    )));
                }
                chain.push(ancestor.clone());
                current = ancestor;
            }
            None => break,
        }
    }

    Ok(chain)
}
