//! Amount type with minor-unit fixed-point arithmetic
//!
//! Every value in the rewards core is held in minor units (hundredths of the
//! platform currency, or the smallest BPT unit) as an i128. This keeps
//! reward distribution exact: splits and tax computations never lose value
//! to floating-point rounding.

use crate::{Result, RewardError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Minor units per major unit (e.g. cents per currency unit).
pub const MINOR_PER_MAJOR: i128 = 100;

/// A signed amount in minor units.
///
/// Wallet balances are kept non-negative by the store; ledger entries may
/// carry negative amounts for debits and recorded payments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Amount(pub i128);

impl Amount {
    /// Create an amount from raw minor units
    pub fn new(minor: i128) -> Self {
        Self(minor)
    }

    /// Create an amount from whole major units
    pub fn from_major(major: i64) -> Self {
        Self(major as i128 * MINOR_PER_MAJOR)
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Negate the amount
    pub fn negate(&self) -> Self {
        Self(-self.0)
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(RewardError::AmountOverflow)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Result<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(RewardError::AmountUnderflow)
    }

    /// Checked multiplication by a scalar
    pub fn checked_mul(self, multiplier: i128) -> Result<Self> {
        self.0
            .checked_mul(multiplier)
            .map(Self)
            .ok_or(RewardError::AmountOverflow)
    }

    /// Multiply by basis points (100 bps = 1%), truncating toward zero
    pub fn basis_points(self, bps: u32) -> Result<Self> {
        let value = self
            .0
            .checked_mul(bps as i128)
            .ok_or(RewardError::AmountOverflow)?
            / 10_000;
        Ok(Self(value))
    }

    /// Split in half with exact conservation.
    ///
    /// Returns `(recipient, pool)` where `recipient + pool == self`. When
    /// the amount is odd in the smallest unit the extra unit goes to the
    /// pool side.
    pub fn split_half(self) -> (Self, Self) {
        let recipient = Self(self.0 / 2);
        let pool = Self(self.0 - recipient.0);
        (recipient, pool)
    }

    /// Positive-only difference against an older amount.
    ///
    /// `new.delta_over(old)` is `max(0, new - old)`; never negative, so a
    /// differential distribution can never claw back value.
    pub fn delta_over(self, old: Self) -> Self {
        Self((self.0 - old.0).max(0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR as u128,
            abs % MINOR_PER_MAJOR as u128
        )
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, a| Amount(acc.0 + a.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_minor_conversion() {
        assert_eq!(Amount::from_major(450).0, 45_000);
        assert_eq!(Amount::from_major(450).to_string(), "450.00");
        assert_eq!(Amount::new(-150).to_string(), "-1.50");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::from_major(100);
        let b = Amount::from_major(40);
        assert_eq!(a.checked_add(b).unwrap(), Amount::from_major(140));
        assert_eq!(a.checked_sub(b).unwrap(), Amount::from_major(60));
        assert!(Amount(i128::MAX).checked_add(Amount(1)).is_err());
    }

    #[test]
    fn test_basis_points() {
        // 7.5% of 1000.00
        let gross = Amount::from_major(1000);
        assert_eq!(gross.basis_points(750).unwrap(), Amount::from_major(75));
    }

    #[test]
    fn test_split_half_conserves_value() {
        for raw in [0i128, 1, 2, 99, 100, 101, 12_345] {
            let gross = Amount::new(raw);
            let (recipient, pool) = gross.split_half();
            assert_eq!(recipient.checked_add(pool).unwrap(), gross);
            assert!(pool >= recipient);
        }
    }

    #[test]
    fn test_odd_unit_goes_to_pool() {
        let (recipient, pool) = Amount::new(101).split_half();
        assert_eq!(recipient, Amount::new(50));
        assert_eq!(pool, Amount::new(51));
    }

    #[test]
    fn test_delta_over_never_negative() {
        let new = Amount::from_major(100);
        let old = Amount::from_major(250);
        assert_eq!(new.delta_over(old), Amount::zero());
        assert_eq!(old.delta_over(new), Amount::from_major(150));
    }
}
