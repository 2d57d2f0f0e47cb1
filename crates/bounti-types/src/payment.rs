//! Payment confirmation input
//!
//! The engine never contacts a payment gateway. Upstream validates the
//! payment and hands the core a receipt; the core only checks the flag.

use serde::{Deserialize, Serialize};

/// A pre-validated payment signal from the upstream payment collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub reference: String,
    pub confirmed: bool,
}

impl PaymentReceipt {
    pub fn confirmed(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            confirmed: true,
        }
    }
}
