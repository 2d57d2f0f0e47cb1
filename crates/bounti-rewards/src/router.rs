//! Wallet router for palliative rewards
//!
//! Pure decision: given the recipient's palliative state, pick the single
//! wallet a palliative-type reward lands in. The caller turns the decision
//! into exactly one credit and writes the ledger entry itself.

use bounti_types::{Account, Wallet};

/// Decide where a palliative reward for this recipient goes.
///
/// 1. Activated palliative with a selected type routes to that type's
///    dedicated wallet.
/// 2. Lower tier, unset tier, and legacy accounts share the pooling
///    wallet.
pub fn route_palliative(account: &Account) -> Wallet {
    if account.palliative_active {
        if let Some(selected) = account.selected_palliative {
            return selected.wallet();
        }
    }
    Wallet::PalliativePool
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounti_types::{PalliativeTier, PalliativeType};

    #[test]
    fn activated_selection_routes_to_the_dedicated_wallet() {
        let mut account = Account::new(None);
        account.palliative_tier = Some(PalliativeTier::Higher);
        account.palliative_active = true;
        account.selected_palliative = Some(PalliativeType::Solar);

        assert_eq!(route_palliative(&account), Wallet::Solar);
    }

    #[test]
    fn lower_tier_pools() {
        let mut account = Account::new(None);
        account.palliative_tier = Some(PalliativeTier::Lower);

        assert_eq!(route_palliative(&account), Wallet::PalliativePool);
    }

    #[test]
    fn unset_tier_falls_back_to_the_pool() {
        let account = Account::new(None);
        assert_eq!(route_palliative(&account), Wallet::PalliativePool);
    }

    #[test]
    fn activation_flag_without_selection_still_pools() {
        let mut account = Account::new(None);
        account.palliative_active = true;

        assert_eq!(route_palliative(&account), Wallet::PalliativePool);
    }
}
