//! Identity types for the Bounti rewards core
//!
//! All identity types are strongly typed wrappers around UUIDs to prevent
//! accidental mixing of different ID types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

// Core identity types
define_id_type!(AccountId, "acct", "Unique identifier for a member account");
define_id_type!(PackageId, "pkg", "Unique identifier for a reward package");
define_id_type!(EdgeId, "edge", "Unique identifier for a referral edge");

// Ledger identity types
define_id_type!(EntryId, "entry", "Unique identifier for a ledger entry");

// Empowerment identity types
define_id_type!(EmpowermentId, "emp", "Unique identifier for an empowerment package");
define_id_type!(AuditEntryId, "audit", "Unique identifier for an empowerment audit row");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_parse() {
        let id = AccountId::new();
        let shown = id.to_string();
        assert!(shown.starts_with("acct_"));

        let parsed = AccountId::parse(&shown).unwrap();
        assert_eq!(parsed, id);

        let bare = AccountId::parse(&id.0.to_string()).unwrap();
        assert_eq!(bare, id);
    }

    #[test]
    fn test_distinct_ids() {
        assert_ne!(AccountId::new(), AccountId::new());
    }
}
