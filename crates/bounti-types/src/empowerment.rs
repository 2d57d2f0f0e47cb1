//! Empowerment package types and lifecycle state
//!
//! A sponsor-funded, beneficiary-targeted long-horizon reward instrument.
//! The package runs a 24-month countdown to maturity, then moves through
//! admin-gated approval and release, with a fallback branch and a
//! sponsor-initiated conversion branch.

use crate::{AccountId, Amount, AuditEntryId, EmpowermentId, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tax rate applied to empowerment values, in basis points (7.5%).
pub const EMPOWERMENT_TAX_BPS: u32 = 750;

/// Months from activation to maturity.
pub const MATURITY_MONTHS: u32 = 24;

/// Lifecycle state of an empowerment package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmpowermentState {
    /// Countdown to maturity is running
    CountdownRunning,
    /// Maturity reached, awaiting admin approval
    PendingMaturity,
    /// Approved by admin, awaiting fund release
    Approved,
    /// Funds released with tax applied; terminal
    Released,
    /// Fallback protection paid out to the sponsor; terminal
    FallbackActivated,
    /// Sponsor converted the package into a standard membership; terminal
    ConvertedToRegularPlus,
}

impl EmpowermentState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Released | Self::FallbackActivated | Self::ConvertedToRegularPlus
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CountdownRunning => "countdown_running",
            Self::PendingMaturity => "pending_maturity",
            Self::Approved => "approved",
            Self::Released => "released",
            Self::FallbackActivated => "fallback_activated",
            Self::ConvertedToRegularPlus => "converted_to_regular_plus",
        }
    }
}

/// A sponsor/beneficiary empowerment package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpowermentPackage {
    pub id: EmpowermentId,
    pub sponsor: AccountId,
    pub beneficiary: AccountId,
    /// Activation fee paid by the sponsor
    pub fee: Amount,
    /// VAT charged on the fee
    pub vat: Amount,
    /// Gross empowerment value destined for the beneficiary
    pub gross_value: Amount,
    /// Net empowerment value after tax, precomputed at activation
    pub net_value: Amount,
    /// Gross sponsor reward
    pub gross_sponsor_reward: Amount,
    /// Net sponsor reward after tax, precomputed at activation
    pub net_sponsor_reward: Amount,
    /// Tax rate captured at activation; approval applies this rate, so the
    /// figures shown to the sponsor can never silently diverge
    pub tax_rate_bps: u32,
    /// Total tax on combined gross values, stored at approval
    pub total_tax: Option<Amount>,
    /// Fallback amounts, precomputed at activation
    pub fallback_gross: Amount,
    pub fallback_net: Amount,
    /// Conversion branch
    pub converted: bool,
    pub conversion_amount: Option<Amount>,
    /// Current lifecycle state
    pub state: EmpowermentState,
    pub activated_at: DateTime<Utc>,
    pub matures_at: DateTime<Utc>,
    pub matured_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub fallback_at: Option<DateTime<Utc>>,
    pub converted_at: Option<DateTime<Utc>>,
}

impl EmpowermentPackage {
    /// Net amount for a gross value at this package's captured tax rate
    pub fn net_of_tax(&self, gross: Amount) -> Result<Amount> {
        gross.checked_sub(gross.basis_points(self.tax_rate_bps)?)
    }

    /// Whether maturity has been reached at `now`
    pub fn is_mature(&self, now: DateTime<Utc>) -> bool {
        now >= self.matures_at
    }
}

/// The labelled transitions of the lifecycle state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmpowermentTransition {
    Activate,
    CheckMaturity,
    Approve,
    Release,
    Fallback,
    Convert,
}

impl EmpowermentTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::CheckMaturity => "check_maturity",
            Self::Approve => "approve",
            Self::Release => "release",
            Self::Fallback => "fallback",
            Self::Convert => "convert",
        }
    }
}

/// Audit row appended on every lifecycle transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpowermentTransaction {
    pub id: AuditEntryId,
    pub package: EmpowermentId,
    pub transition: EmpowermentTransition,
    pub gross: Amount,
    pub tax: Amount,
    pub net: Amount,
    /// The admin or sponsor who triggered the transition
    pub actor: AccountId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!EmpowermentState::CountdownRunning.is_terminal());
        assert!(!EmpowermentState::PendingMaturity.is_terminal());
        assert!(!EmpowermentState::Approved.is_terminal());
        assert!(EmpowermentState::Released.is_terminal());
        assert!(EmpowermentState::FallbackActivated.is_terminal());
        assert!(EmpowermentState::ConvertedToRegularPlus.is_terminal());
    }
}
