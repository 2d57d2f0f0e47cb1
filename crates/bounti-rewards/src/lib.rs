//! Bounti Rewards - Membership reward distribution engine
//!
//! Orchestrates the leaf services for the three membership triggers:
//!
//! - **first activation**: walk the referral chain, pay per-level rewards,
//!   apply shelter tiers, set the membership term
//! - **renewal**: same walk against the renewal tables, plus upkeep
//!   credits and the renewal history record
//! - **upgrade**: distribute only the positive per-level differential
//!   between the old and new package
//!
//! Every trigger commits through the store as one atomic batch; value is
//! conserved (what the tables say is what the chain receives), and an
//! idempotency key stops accidental double distribution.

pub mod chain;
pub mod engine;
pub mod router;
pub mod split;
pub mod tables;

pub use chain::referral_chain;
pub use engine::{
    ActivationOutcome, DistributionTotals, RenewalOutcome, RewardEngine, UpgradeOutcome,
};
pub use router::route_palliative;
pub use split::{split_token, TokenSplit};
pub use tables::RewardTrigger;
