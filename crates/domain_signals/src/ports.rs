//! Signal collaborator ports
//!
//! Ports for the external collaborators the evaluators consume: the
//! historical fraud-case similarity index, the photo authenticity analyzer,
//! and the claimant's claim history used for overlap checks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{CaseId, ClaimantId, DomainPort, HealthCheckable, OperationMetadata, PortError};
use domain_claims::ClaimRecord;

/// A historical fraud case returned by the similarity index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMatch {
    pub case_id: CaseId,
    /// Similarity in `[0, 1]`
    pub similarity: f64,
    /// Short summary of the matched case
    pub summary: String,
}

impl HistoricalMatch {
    pub fn new(case_id: impl Into<CaseId>, similarity: f64, summary: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            similarity,
            summary: summary.into(),
        }
    }
}

/// Port for the historical fraud-case similarity index
#[async_trait]
pub trait PatternIndex: DomainPort + HealthCheckable {
    /// Retrieves up to `k` historical cases most similar to `query_text`
    async fn retrieve(
        &self,
        query_text: &str,
        k: usize,
        metadata: &OperationMetadata,
    ) -> Result<Vec<HistoricalMatch>, PortError>;
}

/// Scores of the five photo authenticity heuristics for one photo
///
/// All scores are in `[0, 1]`. For every heuristic except
/// `consistency_score` a higher value is more suspicious.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAuthenticityReport {
    pub ai_generated_probability: f64,
    pub manipulation_detected: f64,
    pub metadata_tampering: f64,
    /// Lighting and shadow consistency; higher is more authentic
    pub consistency_score: f64,
    pub duplicate_detection: f64,
}

impl PhotoAuthenticityReport {
    /// Report of a photo with no suspicious traits
    pub fn clean() -> Self {
        Self {
            ai_generated_probability: 0.0,
            manipulation_detected: 0.0,
            metadata_tampering: 0.0,
            consistency_score: 1.0,
            duplicate_detection: 0.0,
        }
    }
}

/// Port for the photo authenticity analyzer
#[async_trait]
pub trait PhotoAnalyzer: DomainPort + HealthCheckable {
    /// Runs all authenticity heuristics on one photo
    async fn analyze(
        &self,
        reference: &str,
        photo: &[u8],
        metadata: &OperationMetadata,
    ) -> Result<PhotoAuthenticityReport, PortError>;
}

/// Port for looking up previously filed claims
#[async_trait]
pub trait ClaimHistory: DomainPort + HealthCheckable {
    /// Returns every known claim filed by the claimant.
    ///
    /// Adapters resolve the reference the same way the entity graph does
    /// (case and whitespace insensitive); callers do not re-filter.
    async fn claims_for_claimant(
        &self,
        claimant_id: &ClaimantId,
        metadata: &OperationMetadata,
    ) -> Result<Vec<ClaimRecord>, PortError>;
}
