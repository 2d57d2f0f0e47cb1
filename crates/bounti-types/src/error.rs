//! Error taxonomy for the Bounti rewards core
//!
//! Every trigger aborts on the first error before any balance mutation is
//! committed; nothing is silently swallowed except notification dispatch,
//! which is fire-and-forget by contract.

use thiserror::Error;

/// Result type for rewards-core operations
pub type Result<T> = std::result::Result<T, RewardError>;

/// Typed errors surfaced by the rewards core
#[derive(Debug, Clone, Error)]
pub enum RewardError {
    /// Unknown package, account, edge, or empowerment id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Precondition not met (renewal window, upgrade direction, missing
    /// active package, unconfirmed payment)
    #[error("Not eligible: {reason}")]
    NotEligible { reason: String },

    /// A debit would exceed the wallet balance
    #[error("Insufficient balance in {wallet} wallet: requested {requested}, available {available}")]
    InsufficientBalance {
        wallet: String,
        requested: String,
        available: String,
    },

    /// Maturity check called before the maturity date
    #[error("Empowerment package not mature until {matures_at}")]
    NotMature { matures_at: String },

    /// Lifecycle transition attempted from the wrong state
    #[error("Invalid state for {action}: expected {expected}, found {actual}")]
    InvalidState {
        action: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// Referral chain cycle or orphaned edge
    #[error("Data integrity error: {message}")]
    DataIntegrityError { message: String },

    /// Admin-only operation attempted without the admin claim
    #[error("Unauthorized: {action}")]
    Unauthorized { action: &'static str },

    /// A trigger with this idempotency key already committed
    #[error("Duplicate trigger event: {key}")]
    DuplicateEvent { key: String },

    /// Amount overflow during arithmetic
    #[error("Amount overflow during arithmetic operation")]
    AmountOverflow,

    /// Amount underflow during arithmetic
    #[error("Amount underflow during arithmetic operation")]
    AmountUnderflow,
}

impl RewardError {
    /// Create a not-found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a not-eligible error
    pub fn not_eligible(reason: impl Into<String>) -> Self {
        Self::NotEligible {
            reason: reason.into(),
        }
    }

    /// Create a data integrity error
    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrityError {
            message: message.into(),
        }
    }

    /// Check if this is a retriable error
    ///
    /// Nothing in the core retries automatically; this classification is
    /// for the calling layer.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::NotMature { .. })
    }

    /// Get an error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NotEligible { .. } => "NOT_ELIGIBLE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::NotMature { .. } => "NOT_MATURE",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::DataIntegrityError { .. } => "DATA_INTEGRITY_ERROR",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::DuplicateEvent { .. } => "DUPLICATE_EVENT",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::AmountUnderflow => "AMOUNT_UNDERFLOW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = RewardError::not_found("package", "pkg_x");
        assert_eq!(err.error_code(), "NOT_FOUND");

        let err = RewardError::InsufficientBalance {
            wallet: "main".to_string(),
            requested: "100.00".to_string(),
            available: "50.00".to_string(),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
    }

    #[test]
    fn test_retriable_classification() {
        let not_mature = RewardError::NotMature {
            matures_at: "2028-01-01".to_string(),
        };
        assert!(not_mature.is_retriable());
        assert!(!RewardError::not_eligible("window").is_retriable());
    }
}
