//! Reward package configuration
//!
//! Packages are created and edited by admin tooling and are read-only to
//! the engine. Each package carries per-level reward tables for first
//! activation and renewal, optional shelter amounts for the extended chain,
//! and upkeep amounts credited to the member on renewal.

use crate::{Amount, PackageId, PalliativeTier, Result};
use serde::{Deserialize, Serialize};

/// The four reward components paid per referral level.
///
/// Missing levels resolve to the zero vector, never to null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardVector {
    pub cash: Amount,
    pub palliative: Amount,
    pub token: Amount,
    pub cashback: Amount,
}

impl RewardVector {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.cash.is_zero()
            && self.palliative.is_zero()
            && self.token.is_zero()
            && self.cashback.is_zero()
    }

    /// Elementwise positive-only difference against an older vector.
    ///
    /// Used by the differential upgrade trigger: a component that shrank
    /// between packages contributes zero, never a claw-back.
    pub fn delta_over(&self, old: &RewardVector) -> RewardVector {
        RewardVector {
            cash: self.cash.delta_over(old.cash),
            palliative: self.palliative.delta_over(old.palliative),
            token: self.token.delta_over(old.token),
            cashback: self.cashback.delta_over(old.cashback),
        }
    }

    /// Sum of all four components
    pub fn total(&self) -> Result<Amount> {
        self.cash
            .checked_add(self.palliative)?
            .checked_add(self.token)?
            .checked_add(self.cashback)
    }
}

/// Per-level reward tables: one row for first activation, one for renewal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRewards {
    pub activation: RewardVector,
    pub renewal: RewardVector,
}

/// Upkeep amounts credited to the renewing member where configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpkeepRewards {
    pub health: Amount,
    pub meal: Amount,
    pub security: Amount,
}

/// A membership package, immutable once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardPackage {
    /// Package ID
    pub id: PackageId,
    /// Display name
    pub name: String,
    /// Activation price
    pub price: Amount,
    /// VAT-style tax amount charged alongside the price
    pub vat: Amount,
    /// How long one renewal extends the membership, in days
    pub renewal_cycle_days: i64,
    /// Price tier driving palliative routing
    pub tier: PalliativeTier,
    /// Reward tables, index 0 = level 1
    pub levels: Vec<LevelRewards>,
    /// Shelter amounts for levels 1..=10; empty for non-premium packages
    pub shelter_levels: Vec<Amount>,
    /// Upkeep credited to the member on each renewal
    pub upkeep: UpkeepRewards,
}

impl RewardPackage {
    /// Reward table row for a level (1-based); zero vector when absent.
    pub fn level(&self, level: usize) -> LevelRewards {
        if level == 0 {
            return LevelRewards::default();
        }
        self.levels.get(level - 1).copied().unwrap_or_default()
    }

    /// Shelter amount for a level (1-based); zero when absent.
    pub fn shelter_amount(&self, level: usize) -> Amount {
        if level == 0 {
            return Amount::zero();
        }
        self.shelter_levels.get(level - 1).copied().unwrap_or_default()
    }

    /// Whether this package pays the extended shelter chain.
    pub fn is_shelter_eligible(&self) -> bool {
        self.shelter_levels.iter().any(|a| a.is_positive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package_with_levels(levels: Vec<LevelRewards>) -> RewardPackage {
        RewardPackage {
            id: PackageId::new(),
            name: "Regular".to_string(),
            price: Amount::from_major(1_000),
            vat: Amount::from_major(75),
            renewal_cycle_days: 365,
            tier: PalliativeTier::Lower,
            levels,
            shelter_levels: vec![],
            upkeep: UpkeepRewards::default(),
        }
    }

    #[test]
    fn test_missing_level_resolves_to_zero() {
        let package = package_with_levels(vec![LevelRewards {
            activation: RewardVector {
                cash: Amount::from_major(450),
                ..Default::default()
            },
            renewal: RewardVector::zero(),
        }]);

        assert_eq!(package.level(1).activation.cash, Amount::from_major(450));
        assert!(package.level(2).activation.is_zero());
        assert!(package.level(0).activation.is_zero());
        assert_eq!(package.shelter_amount(3), Amount::zero());
        assert!(!package.is_shelter_eligible());
    }

    #[test]
    fn test_delta_over_clamps_per_component() {
        let old = RewardVector {
            cash: Amount::from_major(450),
            palliative: Amount::from_major(100),
            token: Amount::from_major(50),
            cashback: Amount::from_major(10),
        };
        let new = RewardVector {
            cash: Amount::from_major(600),
            palliative: Amount::from_major(80),
            token: Amount::from_major(50),
            cashback: Amount::from_major(25),
        };

        let delta = new.delta_over(&old);
        assert_eq!(delta.cash, Amount::from_major(150));
        assert_eq!(delta.palliative, Amount::zero());
        assert_eq!(delta.token, Amount::zero());
        assert_eq!(delta.cashback, Amount::from_major(15));
    }
}
