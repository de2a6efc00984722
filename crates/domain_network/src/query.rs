//! Bounded graph traversal and drill-down queries

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::edge::{EdgeId, EdgeType, EntityEdge};
use crate::entity::{EntityKey, EntityNode};
use crate::graph::ClaimGraph;

/// Entities within `radius` hops of the seeds, following edges accepted by `follow`.
///
/// Seeds absent from the graph are ignored.
pub fn bounded_bfs<F>(
    graph: &ClaimGraph,
    seeds: impl IntoIterator<Item = EntityKey>,
    radius: usize,
    follow: F,
) -> BTreeSet<EntityKey>
where
    F: Fn(EdgeType) -> bool,
{
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();

    for seed in seeds {
        if graph.contains_node(&seed) && visited.insert(seed.clone()) {
            queue.push_back((seed, 0usize));
        }
    }

    while let Some((key, depth)) = queue.pop_front() {
        if depth >= radius {
            continue;
        }
        for edge in graph.edges_of(&key) {
            if !follow(edge.edge_type()) {
                continue;
            }
            if let Some(next) = edge.id.other(&key) {
                if visited.insert(next.clone()) {
                    queue.push_back((next.clone(), depth + 1));
                }
            }
        }
    }

    visited
}

/// Edges accepted by `follow` with both endpoints in `nodes`, in edge-id order
pub fn induced_edges<F>(graph: &ClaimGraph, nodes: &BTreeSet<EntityKey>, follow: F) -> Vec<EntityEdge>
where
    F: Fn(EdgeType) -> bool,
{
    let mut edges: BTreeMap<EdgeId, EntityEdge> = BTreeMap::new();
    for key in nodes {
        for edge in graph.edges_of(key) {
            if follow(edge.edge_type())
                && nodes.contains(&edge.id.a)
                && nodes.contains(&edge.id.b)
            {
                edges.entry(edge.id.clone()).or_insert(edge);
            }
        }
    }
    edges.into_values().collect()
}

/// Neighbourhood of an entity, for interactive drill-down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub center: EntityKey,
    pub radius: usize,
    pub nodes: Vec<EntityNode>,
    pub edges: Vec<EntityEdge>,
}

impl Subgraph {
    /// True when the center entity is unknown
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Every entity and edge within `radius` hops of `center`, over all edge types
pub fn query_graph(graph: &ClaimGraph, center: &EntityKey, radius: usize) -> Subgraph {
    let keys = bounded_bfs(graph, [center.clone()], radius, |_| true);
    let edges = induced_edges(graph, &keys, |_| true);
    let nodes = keys.iter().filter_map(|key| graph.node(key)).collect();
    Subgraph {
        center: center.clone(),
        radius,
        nodes,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use core_kernel::ClaimId;

    fn key(kind: EntityKind, v: &str) -> EntityKey {
        EntityKey::resolve(kind, v).unwrap()
    }

    fn chain() -> (ClaimGraph, Vec<EntityKey>) {
        // c1 - a1 - c2 - p1 (co-occurrence)
        let graph = ClaimGraph::new();
        let c1 = key(EntityKind::Claimant, "c1");
        let a1 = key(EntityKind::Address, "a1");
        let c2 = key(EntityKind::Claimant, "c2");
        let p1 = key(EntityKind::Provider, "p1");
        for k in [&c1, &a1, &c2, &p1] {
            graph.upsert_node(k, &ClaimId::new("CLM-1"));
        }
        graph.upsert_edge(&c1, &a1, EdgeType::SameAddress, [ClaimId::new("CLM-1")]);
        graph.upsert_edge(&a1, &c2, EdgeType::SameAddress, [ClaimId::new("CLM-2")]);
        graph.upsert_edge(&c2, &p1, EdgeType::CoOccursInClaim, [ClaimId::new("CLM-2")]);
        (graph, vec![c1, a1, c2, p1])
    }

    #[test]
    fn test_radius_bounds_traversal() {
        let (graph, keys) = chain();
        assert_eq!(bounded_bfs(&graph, [keys[0].clone()], 1, |_| true).len(), 2);
        assert_eq!(bounded_bfs(&graph, [keys[0].clone()], 3, |_| true).len(), 4);
    }

    #[test]
    fn test_filter_restricts_edge_types() {
        let (graph, keys) = chain();
        let reached = bounded_bfs(&graph, [keys[0].clone()], 5, |t| t.is_fraud_relevant());
        assert!(!reached.contains(&keys[3]));
    }

    #[test]
    fn test_query_unknown_entity_is_empty() {
        let (graph, _) = chain();
        let subgraph = query_graph(&graph, &key(EntityKind::Phone, "5550000000"), 2);
        assert!(subgraph.is_empty());
        assert!(subgraph.edges.is_empty());
    }

    #[test]
    fn test_query_includes_induced_edges() {
        let (graph, keys) = chain();
        let subgraph = query_graph(&graph, &keys[2], 1);
        assert_eq!(subgraph.nodes.len(), 3);
        assert_eq!(subgraph.edges.len(), 2);
    }
}
