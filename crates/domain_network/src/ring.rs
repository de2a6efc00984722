//! Ring Detector
//!
//! Starting from the focus claim's entities, the detector walks fraud-relevant
//! edges up to the configured radius, takes the induced subgraph, and scores
//! how much it looks like an organized ring:
//!
//! | Feature | Meaning |
//! |---------|---------|
//! | claimants | distinct claimants beyond the first |
//! | provider concentration | claims per provider beyond one |
//! | reinforced edge weight | weight of edges backed by two or more claims |
//! | temporal clustering | share of claims inside the densest incident window |
//!
//! The weighted feature sum goes through the same saturating curve as the
//! claim fraud score.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{ClaimId, CoreError};

use crate::config::NetworkConfig;
use crate::edge::EntityEdge;
use crate::entity::{ClaimEntities, EntityKey, EntityKind};
use crate::error::NetworkError;
use crate::graph::ClaimGraph;
use crate::query::{bounded_bfs, induced_edges};

/// Result of one ring detection pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkAssessment {
    /// Network score in `[0, 100]`
    pub network_score: f64,
    pub ring_detected: bool,
    pub ring_members: BTreeSet<EntityKey>,
    pub ring_size: usize,
    /// Edges among ring members, heaviest first
    pub evidence_edges: Vec<EntityEdge>,
    pub claimant_count: usize,
    pub provider_count: usize,
    pub claim_count: usize,
    pub reinforced_edge_weight: f64,
    pub temporal_clustering: f64,
}

impl NetworkAssessment {
    /// Assessment of a focus claim with no suspicious neighbourhood
    pub fn empty() -> Self {
        Self {
            network_score: 0.0,
            ring_detected: false,
            ring_members: BTreeSet::new(),
            ring_size: 0,
            evidence_edges: Vec::new(),
            claimant_count: 0,
            provider_count: 0,
            claim_count: 0,
            reinforced_edge_weight: 0.0,
            temporal_clustering: 0.0,
        }
    }
}

/// Detects fraud rings around a focus claim
#[derive(Debug, Clone)]
pub struct RingDetector {
    config: NetworkConfig,
}

impl RingDetector {
    pub fn new(config: NetworkConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Analyzes the neighbourhood of `focus_claim_id`
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::UnknownClaim` if the claim was never ingested.
    /// Sparse or disconnected neighbourhoods are not errors; they yield an
    /// assessment with `ring_size == 0`.
    pub fn detect(
        &self,
        graph: &ClaimGraph,
        focus_claim_id: &ClaimId,
        radius: usize,
    ) -> Result<NetworkAssessment, NetworkError> {
        let focus = graph
            .claim(focus_claim_id)
            .ok_or_else(|| NetworkError::UnknownClaim(focus_claim_id.clone()))?;

        let seeds: Vec<EntityKey> = ClaimEntities::resolve(&focus).all().cloned().collect();
        let nodes = bounded_bfs(graph, seeds, radius, |t| t.is_fraud_relevant());
        let edges = induced_edges(graph, &nodes, |t| t.is_fraud_relevant());

        let claimants: Vec<&EntityKey> = nodes.iter().filter(|k| k.kind == EntityKind::Claimant).collect();
        let provider_count = nodes.iter().filter(|k| k.kind == EntityKind::Provider).count();

        let claim_ids: BTreeSet<ClaimId> = claimants
            .iter()
            .filter_map(|k| graph.node(k))
            .flat_map(|node| node.claim_ids)
            .collect();
        let incident_dates: Vec<NaiveDate> = claim_ids
            .iter()
            .filter_map(|id| graph.claim(id))
            .map(|claim| claim.incident_date)
            .collect();

        let claimant_count = claimants.len();
        let claim_count = claim_ids.len();
        let provider_concentration = if provider_count > 0 {
            (claim_count as f64 / provider_count as f64 - 1.0).max(0.0)
        } else {
            0.0
        };
        let reinforced_edge_weight: f64 = edges
            .iter()
            .map(EntityEdge::weight)
            .filter(|w| *w >= 2.0)
            .sum();
        let temporal_clustering = self.temporal_clustering(&incident_dates);

        let w = &self.config.weights;
        let raw = w.claimants * claimant_count.saturating_sub(1) as f64
            + w.provider_concentration * provider_concentration
            + w.reinforced_edges * reinforced_edge_weight
            + w.temporal_clustering * temporal_clustering;
        let network_score = self.normalize(raw);

        let ring_detected = claimant_count >= self.config.min_claimants
            && network_score >= self.config.ring_score_threshold;

        let (ring_members, evidence_edges) = if ring_detected {
            self.members(&nodes, &edges)
        } else {
            (BTreeSet::new(), Vec::new())
        };

        debug!(
            claim_id = %focus_claim_id,
            nodes = nodes.len(),
            edges = edges.len(),
            claimant_count,
            provider_count,
            claim_count,
            network_score,
            "Ring detection pass"
        );
        if ring_detected {
            info!(
                claim_id = %focus_claim_id,
                ring_size = ring_members.len(),
                network_score,
                "Fraud ring detected"
            );
        }

        Ok(NetworkAssessment {
            network_score,
            ring_detected,
            ring_size: ring_members.len(),
            ring_members,
            evidence_edges,
            claimant_count,
            provider_count,
            claim_count,
            reinforced_edge_weight,
            temporal_clustering,
        })
    }

    /// Entities whose incident edge weight reaches the member threshold
    fn members(
        &self,
        nodes: &BTreeSet<EntityKey>,
        edges: &[EntityEdge],
    ) -> (BTreeSet<EntityKey>, Vec<EntityEdge>) {
        let mut contribution: BTreeMap<&EntityKey, f64> = BTreeMap::new();
        for edge in edges {
            *contribution.entry(&edge.id.a).or_insert(0.0) += edge.weight();
            *contribution.entry(&edge.id.b).or_insert(0.0) += edge.weight();
        }

        let members: BTreeSet<EntityKey> = nodes
            .iter()
            .filter(|k| contribution.get(k).copied().unwrap_or(0.0) >= self.config.min_member_weight)
            .cloned()
            .collect();

        let mut evidence: Vec<EntityEdge> = edges
            .iter()
            .filter(|e| members.contains(&e.id.a) && members.contains(&e.id.b))
            .cloned()
            .collect();
        evidence.sort_by(|x, y| {
            y.weight()
                .total_cmp(&x.weight())
                .then_with(|| x.id.cmp(&y.id))
        });

        (members, evidence)
    }

    /// Largest share of incidents falling inside one coordinated window
    fn temporal_clustering(&self, dates: &[NaiveDate]) -> f64 {
        if dates.len() < 2 {
            return 0.0;
        }
        let mut sorted = dates.to_vec();
        sorted.sort();

        let window = self.config.coordinated_window_days;
        let mut best = 0;
        let mut start = 0;
        for end in 0..sorted.len() {
            while (sorted[end] - sorted[start]).num_days() > window {
                start += 1;
            }
            best = best.max(end - start + 1);
        }
        best as f64 / sorted.len() as f64
    }

    fn normalize(&self, raw: f64) -> f64 {
        let score = 100.0 * (1.0 - (-raw / self.config.normalizer).exp());
        ((score * 100.0).round() / 100.0).clamp(0.0, 100.0)
    }
}
