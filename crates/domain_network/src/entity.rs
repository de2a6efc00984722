//! Entity resolution
//!
//! Claims reference real-world entities through loosely formatted strings.
//! Each entity resolves to an `EntityKey` holding its kind and a normalized
//! identity, so trivial spelling variants ("12 Main St." and "12  main st")
//! land on the same graph node.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ClaimantId, ProviderId};
use domain_claims::ClaimRecord;

use crate::error::NetworkError;

/// Kind of entity referenced by a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Claimant,
    Provider,
    Address,
    Phone,
    Account,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Claimant => "claimant",
            EntityKind::Provider => "provider",
            EntityKind::Address => "address",
            EntityKind::Phone => "phone",
            EntityKind::Account => "account",
        }
    }

    /// Normalizes a raw value of this kind
    pub fn normalize(&self, raw: &str) -> String {
        match self {
            EntityKind::Phone => normalize_phone(raw),
            EntityKind::Account => normalize_account(raw),
            _ => normalize_text(raw),
        }
    }
}

impl FromStr for EntityKind {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claimant" => Ok(EntityKind::Claimant),
            "provider" => Ok(EntityKind::Provider),
            "address" => Ok(EntityKind::Address),
            "phone" => Ok(EntityKind::Phone),
            "account" => Ok(EntityKind::Account),
            other => Err(NetworkError::InvalidEntityKey(format!(
                "unknown entity kind '{}'",
                other
            ))),
        }
    }
}

/// Lowercases, treats `.`, `,` and `#` as separators and collapses whitespace
pub fn normalize_text(raw: &str) -> String {
    raw.to_lowercase()
        .replace(['.', ',', '#'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps digits only, dropping a leading `1` country code on 11-digit numbers
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix('1') {
        Some(rest) if digits.len() == 11 => rest.to_string(),
        _ => digits,
    }
}

/// Drops spaces and dashes and lowercases
pub fn normalize_account(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolved identity of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub normalized: String,
}

impl EntityKey {
    /// Resolves a raw value; `None` when nothing is left after normalization
    pub fn resolve(kind: EntityKind, raw: &str) -> Option<Self> {
        let normalized = kind.normalize(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self { kind, normalized })
        }
    }

    pub fn claimant(id: &ClaimantId) -> Option<Self> {
        Self::resolve(EntityKind::Claimant, id.as_str())
    }

    pub fn provider(id: &ProviderId) -> Option<Self> {
        Self::resolve(EntityKind::Provider, id.as_str())
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.normalized)
    }
}

impl FromStr for EntityKey {
    type Err = NetworkError;

    /// Parses `kind:value`, normalizing the value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, raw) = s.split_once(':').ok_or_else(|| {
            NetworkError::InvalidEntityKey(format!("expected 'kind:value', got '{}'", s))
        })?;
        let kind: EntityKind = kind.parse()?;
        Self::resolve(kind, raw).ok_or_else(|| {
            NetworkError::InvalidEntityKey(format!("'{}' has an empty value", s))
        })
    }
}

/// A graph node: one resolved entity and the claims that reference it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityNode {
    pub key: EntityKey,
    pub claim_ids: BTreeSet<ClaimId>,
}

impl EntityNode {
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            claim_ids: BTreeSet::new(),
        }
    }
}

/// The entities one claim references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimEntities {
    pub claimant: Option<EntityKey>,
    pub provider: Option<EntityKey>,
    /// Address, phone and account entities
    pub shared: Vec<EntityKey>,
}

impl ClaimEntities {
    pub fn resolve(record: &ClaimRecord) -> Self {
        let shared = [
            (EntityKind::Address, record.address.as_deref()),
            (EntityKind::Phone, record.phone.as_deref()),
            (EntityKind::Account, record.bank_account.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, raw)| EntityKey::resolve(kind, raw?))
        .collect();

        Self {
            claimant: EntityKey::claimant(&record.claimant_id),
            provider: EntityKey::provider(&record.provider_id),
            shared,
        }
    }

    /// Every resolved entity of the claim
    pub fn all(&self) -> impl Iterator<Item = &EntityKey> {
        self.claimant
            .iter()
            .chain(self.provider.iter())
            .chain(self.shared.iter())
    }
}
