//! Reward table resolver
//!
//! Pure lookups into a package's per-level reward tables. Missing or
//! unconfigured levels resolve to zero amounts, never to null; package
//! existence is the store's concern.

use bounti_types::{Amount, RewardPackage, RewardVector};

/// Which reward table a trigger reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardTrigger {
    Activation,
    Renewal,
}

/// Resolve the reward vector for a level (1-based) under a trigger
pub fn resolve(package: &RewardPackage, level: usize, trigger: RewardTrigger) -> RewardVector {
    let row = package.level(level);
    match trigger {
        RewardTrigger::Activation => row.activation,
        RewardTrigger::Renewal => row.renewal,
    }
}

/// Resolve the shelter amount for a level (1-based)
pub fn resolve_shelter(package: &RewardPackage, level: usize) -> Amount {
    package.shelter_amount(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounti_types::{LevelRewards, PackageId, PalliativeTier, UpkeepRewards};

    fn package() -> RewardPackage {
        RewardPackage {
            id: PackageId::new(),
            name: "Premium".to_string(),
            price: Amount::from_major(5_000),
            vat: Amount::from_major(375),
            renewal_cycle_days: 365,
            tier: PalliativeTier::Higher,
            levels: vec![
                LevelRewards {
                    activation: RewardVector {
                        cash: Amount::from_major(450),
                        ..Default::default()
                    },
                    renewal: RewardVector {
                        cash: Amount::from_major(200),
                        ..Default::default()
                    },
                },
                LevelRewards {
                    activation: RewardVector {
                        cash: Amount::from_major(225),
                        ..Default::default()
                    },
                    renewal: RewardVector::zero(),
                },
            ],
            shelter_levels: vec![Amount::from_major(30), Amount::from_major(15)],
            upkeep: UpkeepRewards::default(),
        }
    }

    #[test]
    fn resolves_the_trigger_specific_table() {
        let package = package();
        assert_eq!(
            resolve(&package, 1, RewardTrigger::Activation).cash,
            Amount::from_major(450)
        );
        assert_eq!(
            resolve(&package, 1, RewardTrigger::Renewal).cash,
            Amount::from_major(200)
        );
        assert!(resolve(&package, 2, RewardTrigger::Renewal).is_zero());
    }

    #[test]
    fn missing_levels_resolve_to_zero() {
        let package = package();
        assert!(resolve(&package, 3, RewardTrigger::Activation).is_zero());
        assert!(resolve(&package, 99, RewardTrigger::Activation).is_zero());
        assert_eq!(resolve_shelter(&package, 2), Amount::from_major(15));
        assert_eq!(resolve_shelter(&package, 3), Amount::zero());
    }
}
