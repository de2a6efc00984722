//! Entity Graph Builder
//!
//! Ingestion resolves a claim's entities, upserts their nodes and records
//! three families of edges:
//!
//! - in-claim: claimant to provider (co-occurrence) and claimant to each of
//!   its address, phone and account
//! - cross-claim: claimant to claimant when two different claimants resolve
//!   to the same address, phone or account
//! - coordinated timing: claimant to provider when the provider served
//!   different claimants with incidents inside the coordinated window
//!
//! Edge provenance is a set of claim ids, so ingesting the same record again
//! leaves the graph unchanged.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::ClaimId;
use domain_claims::ClaimRecord;

use crate::edge::{EdgeId, EdgeType};
use crate::entity::{ClaimEntities, EntityKey};
use crate::graph::{ClaimGraph, EdgeChange};

/// Changes made to the graph by one ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDelta {
    pub claim_id: ClaimId,
    pub new_nodes: Vec<EntityKey>,
    pub new_edges: Vec<EdgeId>,
    pub reinforced_edges: Vec<EdgeId>,
}

impl GraphDelta {
    fn new(claim_id: ClaimId) -> Self {
        Self {
            claim_id,
            new_nodes: Vec::new(),
            new_edges: Vec::new(),
            reinforced_edges: Vec::new(),
        }
    }

    /// True when ingestion changed nothing
    pub fn is_empty(&self) -> bool {
        self.new_nodes.is_empty() && self.new_edges.is_empty() && self.reinforced_edges.is_empty()
    }

    fn record(&mut self, id: EdgeId, change: EdgeChange) {
        match change {
            EdgeChange::Created => self.new_edges.push(id),
            EdgeChange::Reinforced => self.reinforced_edges.push(id),
            EdgeChange::Unchanged => {}
        }
    }
}

/// Writes claims into the shared claim graph
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    graph: Arc<ClaimGraph>,
    coordinated_window_days: i64,
}

impl GraphBuilder {
    pub fn new(graph: Arc<ClaimGraph>, coordinated_window_days: i64) -> Self {
        Self {
            graph,
            coordinated_window_days,
        }
    }

    pub fn graph(&self) -> &Arc<ClaimGraph> {
        &self.graph
    }

    /// Ingests one claim
    pub fn ingest(&self, record: &ClaimRecord) -> GraphDelta {
        let claim_id = &record.claim_id;
        let mut delta = GraphDelta::new(claim_id.clone());

        // Registered first so concurrent ingestions that see this claim on a
        // shared node can always load it.
        self.graph.register_claim(record);

        let entities = ClaimEntities::resolve(record);
        let mut claims_on = Vec::new();
        for key in entities.all() {
            let (created, claim_ids) = self.graph.upsert_node(key, claim_id);
            if created {
                delta.new_nodes.push(key.clone());
            }
            claims_on.push((key.clone(), claim_ids));
        }

        let Some(claimant) = entities.claimant.as_ref() else {
            return delta;
        };

        if let Some(provider) = entities.provider.as_ref() {
            self.link(&mut delta, claimant, provider, EdgeType::CoOccursInClaim, [claim_id.clone()]);
        }

        for (key, claim_ids) in &claims_on {
            let Some(edge_type) = EdgeType::shared(key.kind) else {
                continue;
            };
            self.link(&mut delta, claimant, key, edge_type, [claim_id.clone()]);

            for other_id in claim_ids.iter().filter(|id| *id != claim_id) {
                let Some(other_claimant) = self.claimant_of(other_id) else {
                    continue;
                };
                if &other_claimant != claimant {
                    self.link(
                        &mut delta,
                        claimant,
                        &other_claimant,
                        edge_type,
                        [claim_id.clone(), other_id.clone()],
                    );
                }
            }
        }

        if let Some(provider) = entities.provider.as_ref() {
            let provider_claims = claims_on
                .iter()
                .find(|(key, _)| key == provider)
                .map(|(_, ids)| ids.clone())
                .unwrap_or_default();
            self.link_coordinated(&mut delta, record, claimant, provider, &provider_claims);
        }

        debug!(
            claim_id = %claim_id,
            new_nodes = delta.new_nodes.len(),
            new_edges = delta.new_edges.len(),
            reinforced_edges = delta.reinforced_edges.len(),
            "Ingested claim into graph"
        );
        delta
    }

    fn link_coordinated(
        &self,
        delta: &mut GraphDelta,
        record: &ClaimRecord,
        claimant: &EntityKey,
        provider: &EntityKey,
        provider_claims: &BTreeSet<ClaimId>,
    ) {
        for other_id in provider_claims.iter().filter(|id| **id != record.claim_id) {
            let Some(other) = self.graph.claim(other_id) else {
                continue;
            };
            let Some(other_claimant) = EntityKey::claimant(&other.claimant_id) else {
                continue;
            };
            if &other_claimant == claimant {
                continue;
            }
            let gap = (record.incident_date - other.incident_date).num_days().abs();
            if gap > self.coordinated_window_days {
                continue;
            }

            let provenance = [record.claim_id.clone(), other_id.clone()];
            self.link(delta, claimant, provider, EdgeType::CoordinatedTiming, provenance.clone());
            self.link(delta, &other_claimant, provider, EdgeType::CoordinatedTiming, provenance);
        }
    }

    fn claimant_of(&self, claim_id: &ClaimId) -> Option<EntityKey> {
        let other = self.graph.claim(claim_id)?;
        EntityKey::claimant(&other.claimant_id)
    }

    fn link<I>(&self, delta: &mut GraphDelta, x: &EntityKey, y: &EntityKey, edge_type: EdgeType, provenance: I)
    where
        I: IntoIterator<Item = ClaimId>,
    {
        let change = self.graph.upsert_edge(x, y, edge_type, provenance);
        delta.record(EdgeId::new(x.clone(), y.clone(), edge_type), change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::{ClaimantId, ProviderId};
    use domain_claims::ClaimCategory;
    use rust_decimal::Decimal;

    fn claim(id: &str, claimant: &str, provider: &str, address: &str, day: u32) -> ClaimRecord {
        let date = NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
        ClaimRecord {
            claim_id: ClaimId::new(id),
            claimant_id: ClaimantId::new(claimant),
            provider_id: ProviderId::new(provider),
            claimant_name: None,
            provider_name: None,
            address: Some(address.to_string()),
            phone: None,
            bank_account: None,
            category: ClaimCategory::AutoCollision,
            incident_date: date,
            incident_end_date: None,
            report_date: date,
            claimed_amount: Decimal::new(2500, 0),
            location: None,
            narrative: String::new(),
            attachments: vec![],
        }
    }

    #[test]
    fn test_single_claim_edges() {
        let builder = GraphBuilder::new(Arc::new(ClaimGraph::new()), 14);
        let delta = builder.ingest(&claim("CLM-1", "PTY-1", "PRV-1", "12 Main St", 1));

        assert_eq!(delta.new_nodes.len(), 3);
        assert_eq!(delta.new_edges.len(), 2);
        assert!(delta
            .new_edges
            .iter()
            .any(|e| e.edge_type == EdgeType::CoOccursInClaim));
    }

    #[test]
    fn test_reingest_changes_nothing() {
        let builder = GraphBuilder::new(Arc::new(ClaimGraph::new()), 14);
        let record = claim("CLM-1", "PTY-1", "PRV-1", "12 Main St", 1);
        builder.ingest(&record);
        let before = builder.graph().snapshot();

        let delta = builder.ingest(&record);
        assert!(delta.is_empty());
        assert_eq!(builder.graph().snapshot(), before);
    }

    #[test]
    fn test_shared_address_links_claimants() {
        let builder = GraphBuilder::new(Arc::new(ClaimGraph::new()), 14);
        builder.ingest(&claim("CLM-1", "PTY-1", "PRV-1", "12 Main St", 1));
        let delta = builder.ingest(&claim("CLM-2", "PTY-2", "PRV-2", "12 main st.", 20));

        let c1 = EntityKey::claimant(&ClaimantId::new("PTY-1")).unwrap();
        let c2 = EntityKey::claimant(&ClaimantId::new("PTY-2")).unwrap();
        let link = EdgeId::new(c1, c2, EdgeType::SameAddress);
        assert!(delta.new_edges.contains(&link));
        assert_eq!(builder.graph().edge(&link).unwrap().weight(), 2.0);
    }

    #[test]
    fn test_coordinated_timing_respects_window() {
        let builder = GraphBuilder::new(Arc::new(ClaimGraph::new()), 14);
        builder.ingest(&claim("CLM-1", "PTY-1", "PRV-1", "1 Oak Ave", 1));
        builder.ingest(&claim("CLM-2", "PTY-2", "PRV-1", "2 Elm Rd", 10));
        builder.ingest(&claim("CLM-3", "PTY-3", "PRV-1", "3 Ash Ln", 30));

        let provider = EntityKey::provider(&ProviderId::new("PRV-1")).unwrap();
        let coordinated: Vec<_> = builder
            .graph()
            .edges_of(&provider)
            .into_iter()
            .filter(|e| e.edge_type() == EdgeType::CoordinatedTiming)
            .collect();
        assert_eq!(coordinated.len(), 2);
    }
}
