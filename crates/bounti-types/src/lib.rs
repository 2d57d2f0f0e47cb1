//! Bounti Types - Canonical domain types for the membership rewards core
//!
//! This crate contains all foundational types for the Bounti rewards engine
//! with zero dependencies on other bounti crates:
//!
//! - Identity types (AccountId, PackageId, EmpowermentId, etc.)
//! - Amount type with minor-unit fixed-point arithmetic
//! - The closed wallet identifier set and palliative routing types
//! - Account, reward package, and referral edge entities
//! - Empowerment package and its lifecycle state
//! - The error taxonomy shared by every engine trigger
//!
//! # Invariants
//!
//! 1. Wallet balances never go negative
//! 2. Balances are mutated only through engine-issued commits
//! 3. Reward tables are read-only to the engine
//! 4. Every value movement is typed, never stringly keyed

pub mod account;
pub mod amount;
pub mod edge;
pub mod empowerment;
pub mod error;
pub mod identity;
pub mod package;
pub mod payment;
pub mod records;
pub mod wallet;

pub use account::*;
pub use amount::*;
pub use edge::*;
pub use empowerment::*;
pub use error::*;
pub use identity::*;
pub use package::*;
pub use payment::*;
pub use records::*;
pub use wallet::*;

/// Depth of the standard referral reward chain.
pub const REFERRAL_DEPTH: usize = 4;

/// Depth of the extended shelter reward chain for premium tiers.
pub const SHELTER_DEPTH: usize = 10;

/// Length of a membership term granted at first activation, in days.
pub const ACTIVATION_TERM_DAYS: i64 = 365;

/// How close to expiry an account must be before renewal opens, in days.
pub const RENEWAL_WINDOW_DAYS: i64 = 30;
