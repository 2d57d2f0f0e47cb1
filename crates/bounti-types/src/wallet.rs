//! Wallet identifiers and palliative routing types
//!
//! Every account holds a fixed set of named balances. The set is a closed
//! enum so a wallet can only ever be addressed through an explicit match,
//! never through a string-keyed field lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of wallets an account holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wallet {
    /// Primary cash wallet; referral cash and sponsor rewards land here
    Main,
    /// Freely spendable balance
    Spendable,
    /// Cashback rewards
    Cashback,
    /// BPT utility token balance
    Token,
    /// Shared pool for palliative rewards before a type is selected
    PalliativePool,
    /// Extended-tier shelter rewards
    Shelter,
    Community,
    Health,
    /// Education wallet; also holds released empowerment value (view-only
    /// to the beneficiary, not withdrawable)
    Education,
    Meal,
    Security,
    Business,
    Land,
    Car,
    House,
    Solar,
    Shareholder,
    SocialMedia,
    StudentCashback,
}

impl Wallet {
    /// Stable lowercase code, used in ledger descriptions and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Wallet::Main => "main",
            Wallet::Spendable => "spendable",
            Wallet::Cashback => "cashback",
            Wallet::Token => "token",
            Wallet::PalliativePool => "palliative_pool",
            Wallet::Shelter => "shelter",
            Wallet::Community => "community",
            Wallet::Health => "health",
            Wallet::Education => "education",
            Wallet::Meal => "meal",
            Wallet::Security => "security",
            Wallet::Business => "business",
            Wallet::Land => "land",
            Wallet::Car => "car",
            Wallet::House => "house",
            Wallet::Solar => "solar",
            Wallet::Shareholder => "shareholder",
            Wallet::SocialMedia => "social_media",
            Wallet::StudentCashback => "student_cashback",
        }
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price tier of a membership package, driving palliative routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PalliativeTier {
    Lower,
    Higher,
}

/// The in-kind reward categories a higher-tier member can select.
///
/// Each type maps to exactly one dedicated wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PalliativeType {
    Car,
    House,
    Land,
    Business,
    Solar,
    Education,
}

impl PalliativeType {
    /// The dedicated wallet this palliative type routes to.
    pub fn wallet(&self) -> Wallet {
        match self {
            PalliativeType::Car => Wallet::Car,
            PalliativeType::House => Wallet::House,
            PalliativeType::Land => Wallet::Land,
            PalliativeType::Business => Wallet::Business,
            PalliativeType::Solar => Wallet::Solar,
            PalliativeType::Education => Wallet::Education,
        }
    }
}

impl fmt::Display for PalliativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wallet().as_str())
    }
}
