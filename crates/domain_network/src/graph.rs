//! Claim graph store
//!
//! The graph is the one mutable resource shared by every concurrent
//! assessment run. It is an explicit store object, injected where needed,
//! backed by sharded concurrent maps. Every mutation is a read-modify-write
//! on a single map entry performed under that entry's shard lock, so two runs
//! touching the same node or edge never lose each other's updates. No method
//! holds a guard on one map while locking another.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use core_kernel::{ClaimId, ClaimantId};
use domain_claims::ClaimRecord;

use crate::edge::{EdgeId, EdgeType, EntityEdge};
use crate::entity::{EntityKey, EntityNode};

/// Outcome of an edge upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    Created,
    /// Provenance grew
    Reinforced,
    Unchanged,
}

/// Point-in-time copy of the graph, ordered for comparison
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<EntityKey, EntityNode>,
    pub edges: BTreeMap<EdgeId, EntityEdge>,
}

/// Concurrent entity graph over all claims processed so far
#[derive(Debug, Default)]
pub struct ClaimGraph {
    nodes: DashMap<EntityKey, EntityNode>,
    edges: DashMap<EdgeId, EntityEdge>,
    adjacency: DashMap<EntityKey, BTreeSet<EdgeId>>,
    claims: DashMap<ClaimId, Arc<ClaimRecord>>,
}

impl ClaimGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the claim record; returns false if an identical record was present
    pub fn register_claim(&self, record: &ClaimRecord) -> bool {
        match self.claims.entry(record.claim_id.clone()) {
            Entry::Occupied(mut existing) => {
                if existing.get().as_ref() == record {
                    return false;
                }
                existing.insert(Arc::new(record.clone()));
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(record.clone()));
                true
            }
        }
    }

    pub fn claim(&self, claim_id: &ClaimId) -> Option<Arc<ClaimRecord>> {
        self.claims.get(claim_id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains_claim(&self, claim_id: &ClaimId) -> bool {
        self.claims.contains_key(claim_id)
    }

    /// Claims whose claimant resolves to the same node as `claimant_id`
    pub fn claims_for_claimant(&self, claimant_id: &ClaimantId) -> Vec<Arc<ClaimRecord>> {
        let Some(key) = EntityKey::claimant(claimant_id) else {
            return Vec::new();
        };
        self.claims_of(&key)
    }

    /// Claims referencing an entity, in claim-id order
    pub fn claims_of(&self, key: &EntityKey) -> Vec<Arc<ClaimRecord>> {
        let ids = self
            .nodes
            .get(key)
            .map(|node| node.claim_ids.clone())
            .unwrap_or_default();
        ids.iter().filter_map(|id| self.claim(id)).collect()
    }

    /// Adds `claim_id` to the node for `key`, creating the node if needed.
    ///
    /// Returns whether the node was created and the node's claim set as of
    /// this update.
    pub fn upsert_node(&self, key: &EntityKey, claim_id: &ClaimId) -> (bool, BTreeSet<ClaimId>) {
        let mut created = false;
        let mut node = self.nodes.entry(key.clone()).or_insert_with(|| {
            created = true;
            EntityNode::new(key.clone())
        });
        node.claim_ids.insert(claim_id.clone());
        (created, node.claim_ids.clone())
    }

    /// Adds provenance to the edge between `x` and `y`, creating it if needed
    pub fn upsert_edge<I>(&self, x: &EntityKey, y: &EntityKey, edge_type: EdgeType, provenance: I) -> EdgeChange
    where
        I: IntoIterator<Item = ClaimId>,
    {
        let id = EdgeId::new(x.clone(), y.clone(), edge_type);
        let change = {
            let mut created = false;
            let mut edge = self.edges.entry(id.clone()).or_insert_with(|| {
                created = true;
                EntityEdge::new(id.clone())
            });
            let before = edge.provenance.len();
            edge.provenance.extend(provenance);
            if created {
                EdgeChange::Created
            } else if edge.provenance.len() > before {
                EdgeChange::Reinforced
            } else {
                EdgeChange::Unchanged
            }
        };

        if change == EdgeChange::Created {
            for endpoint in [&id.a, &id.b] {
                self.adjacency
                    .entry(endpoint.clone())
                    .or_default()
                    .insert(id.clone());
            }
        }
        change
    }

    pub fn node(&self, key: &EntityKey) -> Option<EntityNode> {
        self.nodes.get(key).map(|n| n.value().clone())
    }

    pub fn edge(&self, id: &EdgeId) -> Option<EntityEdge> {
        self.edges.get(id).map(|e| e.value().clone())
    }

    pub fn contains_node(&self, key: &EntityKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Edges incident to `key`, in edge-id order
    pub fn edges_of(&self, key: &EntityKey) -> Vec<EntityEdge> {
        let ids = self
            .adjacency
            .get(key)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        ids.iter().filter_map(|id| self.edge(id)).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|n| (n.key().clone(), n.value().clone()))
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        }
    }
}
