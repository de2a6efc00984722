//! Entity edges

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;

use crate::entity::{EntityKey, EntityKind};

/// Relation between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    SameAddress,
    SamePhone,
    SameBankAccount,
    /// Both entities appear on one claim
    CoOccursInClaim,
    /// A provider served different claimants within the coordinated window
    CoordinatedTiming,
}

impl EdgeType {
    /// Whether ring detection may traverse this edge
    pub fn is_fraud_relevant(&self) -> bool {
        !matches!(self, EdgeType::CoOccursInClaim)
    }

    /// Edge type linking claimants that share an entity of `kind`
    pub fn shared(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::Address => Some(EdgeType::SameAddress),
            EntityKind::Phone => Some(EdgeType::SamePhone),
            EntityKind::Account => Some(EdgeType::SameBankAccount),
            EntityKind::Claimant | EntityKind::Provider => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::SameAddress => "same_address",
            EdgeType::SamePhone => "same_phone",
            EdgeType::SameBankAccount => "same_bank_account",
            EdgeType::CoOccursInClaim => "co_occurs_in_claim",
            EdgeType::CoordinatedTiming => "coordinated_timing",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical edge identity; endpoints are stored in ascending order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId {
    pub a: EntityKey,
    pub b: EntityKey,
    pub edge_type: EdgeType,
}

impl EdgeId {
    pub fn new(x: EntityKey, y: EntityKey, edge_type: EdgeType) -> Self {
        if x <= y {
            Self { a: x, b: y, edge_type }
        } else {
            Self { a: y, b: x, edge_type }
        }
    }

    /// The endpoint opposite `key`, if `key` is an endpoint
    pub fn other(&self, key: &EntityKey) -> Option<&EntityKey> {
        if &self.a == key {
            Some(&self.b)
        } else if &self.b == key {
            Some(&self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]- {}", self.a, self.edge_type, self.b)
    }
}

/// An edge with the claims that established it
///
/// The provenance set doubles as the ingestion marker: a claim contributes
/// to an edge's weight at most once, however often it is ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEdge {
    pub id: EdgeId,
    pub provenance: BTreeSet<ClaimId>,
}

impl EntityEdge {
    pub fn new(id: EdgeId) -> Self {
        Self {
            id,
            provenance: BTreeSet::new(),
        }
    }

    pub fn edge_type(&self) -> EdgeType {
        self.id.edge_type
    }

    /// Number of distinct claims supporting the relation
    pub fn weight(&self) -> f64 {
        self.provenance.len() as f64
    }
}
