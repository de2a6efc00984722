//! Strongly-typed identifiers for domain entities
//!
//! Claims, claimants, providers and historical fraud cases are identified by
//! references issued by upstream systems (document extraction, the historical
//! case index), so they wrap strings. Assessment runs are minted here and wrap
//! time-ordered UUIDs. Using newtypes prevents accidental mixing of a claimant
//! reference with a provider reference when building the entity graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_ref {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from an upstream reference
            pub fn new(reference: impl Into<String>) -> Self {
                Self(reference.into())
            }

            /// Returns the raw reference
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the reference is empty or whitespace only
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }

            /// Returns the identifier prefix used in logs and reports
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(reference: &str) -> Self {
                Self(reference.to_string())
            }
        }

        impl From<String> for $name {
            fn from(reference: String) -> Self {
                Self(reference)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new_v7()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Upstream references
define_ref!(ClaimId, "CLM");
define_ref!(ClaimantId, "PTY");
define_ref!(ProviderId, "PRV");
define_ref!(CaseId, "CASE");

// Engine-issued identifiers
define_id!(RunId, "RUN");

impl ClaimId {
    /// Placeholder used when a run fails before a claim reference is known
    pub fn unassigned() -> Self {
        Self("UNASSIGNED".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_id_display_is_raw_reference() {
        let id = ClaimId::new("CLM-1042");
        assert_eq!(id.to_string(), "CLM-1042");
    }

    #[test]
    fn test_blank_reference() {
        assert!(ClaimantId::new("   ").is_blank());
        assert!(!ClaimantId::new("P-1").is_blank());
    }

    #[test]
    fn test_run_id_parsing() {
        let original = RunId::new_v7();
        let parsed: RunId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }
}
