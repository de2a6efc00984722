//! External collaborators of the engine

use std::sync::Arc;

use async_trait::async_trait;

use core_kernel::{
    ClaimantId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};
use domain_claims::{ClaimRecord, DocumentExtractor};
use domain_network::ClaimGraph;
use domain_signals::{ClaimHistory, PatternIndex, PhotoAnalyzer};

use crate::narrative::NarrativeGenerator;

/// Adapters the engine calls out to
///
/// Without an explicit claim history the engine answers overlap lookups from
/// its own claim graph. Without a narrator only the template narrative is
/// available.
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn DocumentExtractor>,
    pub pattern_index: Arc<dyn PatternIndex>,
    pub photo_analyzer: Arc<dyn PhotoAnalyzer>,
    pub claim_history: Option<Arc<dyn ClaimHistory>>,
    pub narrator: Option<Arc<dyn NarrativeGenerator>>,
}

impl Collaborators {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        pattern_index: Arc<dyn PatternIndex>,
        photo_analyzer: Arc<dyn PhotoAnalyzer>,
    ) -> Self {
        Self {
            extractor,
            pattern_index,
            photo_analyzer,
            claim_history: None,
            narrator: None,
        }
    }

    pub fn with_claim_history(mut self, history: Arc<dyn ClaimHistory>) -> Self {
        self.claim_history = Some(history);
        self
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }
}

/// Claim history served from the shared claim graph
#[derive(Debug, Clone)]
pub struct GraphClaimHistory {
    graph: Arc<ClaimGraph>,
}

impl GraphClaimHistory {
    pub fn new(graph: Arc<ClaimGraph>) -> Self {
        Self { graph }
    }
}

impl DomainPort for GraphClaimHistory {}

#[async_trait]
impl HealthCheckable for GraphClaimHistory {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("graph-claim-history")
    }
}

#[async_trait]
impl ClaimHistory for GraphClaimHistory {
    async fn claims_for_claimant(
        &self,
        claimant_id: &ClaimantId,
        _metadata: &OperationMetadata,
    ) -> Result<Vec<ClaimRecord>, PortError> {
        Ok(self
            .graph
            .claims_for_claimant(claimant_id)
            .into_iter()
            .map(|claim| claim.as_ref().clone())
            .collect())
    }
}
