//! Mock Collaborators
//!
//! In-memory, failing and slow implementations of the collaborator ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use core_kernel::{
    ClaimantId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};
use domain_claims::{ClaimRecord, DocumentExtractor, ExtractionError};
use domain_network::EntityKey;
use domain_signals::{
    ClaimHistory, HistoricalMatch, PatternIndex, PhotoAnalyzer, PhotoAuthenticityReport,
};

/// Pattern index returning a fixed list of matches
#[derive(Debug, Clone, Default)]
pub struct StaticPatternIndex {
    matches: Vec<HistoricalMatch>,
}

impl StaticPatternIndex {
    pub fn new(matches: Vec<HistoricalMatch>) -> Self {
        Self { matches }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl DomainPort for StaticPatternIndex {}

#[async_trait]
impl HealthCheckable for StaticPatternIndex {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("static-pattern-index")
    }
}

#[async_trait]
impl PatternIndex for StaticPatternIndex {
    async fn retrieve(
        &self,
        _query_text: &str,
        k: usize,
        _metadata: &OperationMetadata,
    ) -> Result<Vec<HistoricalMatch>, PortError> {
        Ok(self.matches.iter().take(k).cloned().collect())
    }
}

/// How a failing collaborator fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Timeout reported by the collaborator itself
    Timeout,
    Unavailable,
    /// Broken contract, e.g. malformed response
    ContractViolation,
    Panic,
}

impl FailureMode {
    fn error(&self, operation: &str) -> PortError {
        match self {
            FailureMode::Timeout => PortError::timeout(operation, 5000),
            FailureMode::Unavailable => PortError::unavailable(operation),
            FailureMode::ContractViolation => {
                PortError::transformation(format!("{} returned a malformed response", operation))
            }
            FailureMode::Panic => panic!("{} crashed", operation),
        }
    }
}

/// Pattern index that always fails
#[derive(Debug, Clone, Copy)]
pub struct FailingPatternIndex {
    mode: FailureMode,
}

impl FailingPatternIndex {
    pub fn new(mode: FailureMode) -> Self {
        Self { mode }
    }
}

impl DomainPort for FailingPatternIndex {}

#[async_trait]
impl HealthCheckable for FailingPatternIndex {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::unhealthy("failing-pattern-index", format!("{:?}", self.mode))
    }
}

#[async_trait]
impl PatternIndex for FailingPatternIndex {
    async fn retrieve(
        &self,
        _query_text: &str,
        _k: usize,
        _metadata: &OperationMetadata,
    ) -> Result<Vec<HistoricalMatch>, PortError> {
        Err(self.mode.error("pattern-index"))
    }
}

/// Pattern index that sleeps before answering
///
/// `completed()` reports whether any call ran to completion, so tests can
/// check that cancelled or timed-out calls were abandoned.
#[derive(Debug, Clone)]
pub struct SlowPatternIndex {
    delay: Duration,
    inner: StaticPatternIndex,
    completed: Arc<AtomicBool>,
}

impl SlowPatternIndex {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: StaticPatternIndex::empty(),
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

impl DomainPort for SlowPatternIndex {}

#[async_trait]
impl HealthCheckable for SlowPatternIndex {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("slow-pattern-index")
    }
}

#[async_trait]
impl PatternIndex for SlowPatternIndex {
    async fn retrieve(
        &self,
        query_text: &str,
        k: usize,
        metadata: &OperationMetadata,
    ) -> Result<Vec<HistoricalMatch>, PortError> {
        tokio::time::sleep(self.delay).await;
        self.completed.store(true, Ordering::SeqCst);
        self.inner.retrieve(query_text, k, metadata).await
    }
}

/// Photo analyzer returning canned reports by photo reference
#[derive(Debug, Clone, Default)]
pub struct StubPhotoAnalyzer {
    reports: HashMap<String, PhotoAuthenticityReport>,
    failure: Option<FailureMode>,
    calls: Arc<AtomicUsize>,
}

impl StubPhotoAnalyzer {
    /// Analyzer reporting every photo as clean
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn failing(mode: FailureMode) -> Self {
        Self {
            failure: Some(mode),
            ..Self::default()
        }
    }

    pub fn with_report(mut self, reference: impl Into<String>, report: PhotoAuthenticityReport) -> Self {
        self.reports.insert(reference.into(), report);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Report of a synthetic, manipulated photo
    pub fn synthetic_report() -> PhotoAuthenticityReport {
        PhotoAuthenticityReport {
            ai_generated_probability: 0.92,
            manipulation_detected: 0.81,
            metadata_tampering: 0.7,
            consistency_score: 0.2,
            duplicate_detection: 0.1,
        }
    }
}

impl DomainPort for StubPhotoAnalyzer {}

#[async_trait]
impl HealthCheckable for StubPhotoAnalyzer {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("stub-photo-analyzer")
    }
}

#[async_trait]
impl PhotoAnalyzer for StubPhotoAnalyzer {
    async fn analyze(
        &self,
        reference: &str,
        _photo: &[u8],
        _metadata: &OperationMetadata,
    ) -> Result<PhotoAuthenticityReport, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(mode) = self.failure {
            return Err(mode.error("photo-analyzer"));
        }
        Ok(self
            .reports
            .get(reference)
            .cloned()
            .unwrap_or_else(PhotoAuthenticityReport::clean))
    }
}

/// Extractor returning a fixed record
#[derive(Debug, Clone, Default)]
pub struct StubExtractor {
    record: Option<ClaimRecord>,
}

impl StubExtractor {
    pub fn returning(record: ClaimRecord) -> Self {
        Self {
            record: Some(record),
        }
    }

    /// Extractor that cannot read any document
    pub fn unreadable() -> Self {
        Self::default()
    }
}

impl DomainPort for StubExtractor {}

#[async_trait]
impl HealthCheckable for StubExtractor {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("stub-extractor")
    }
}

#[async_trait]
impl DocumentExtractor for StubExtractor {
    async fn extract(
        &self,
        _document: &[u8],
        _metadata: &OperationMetadata,
    ) -> Result<ClaimRecord, ExtractionError> {
        self.record
            .clone()
            .ok_or_else(|| ExtractionError::Unreadable("no text layer found".to_string()))
    }
}

/// Claim history with no prior claims
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyClaimHistory;

impl DomainPort for EmptyClaimHistory {}

#[async_trait]
impl HealthCheckable for EmptyClaimHistory {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("empty-claim-history")
    }
}

#[async_trait]
impl ClaimHistory for EmptyClaimHistory {
    async fn claims_for_claimant(
        &self,
        _claimant_id: &ClaimantId,
        _metadata: &OperationMetadata,
    ) -> Result<Vec<ClaimRecord>, PortError> {
        Ok(Vec::new())
    }
}

/// Claim history backed by a fixed list of claims
#[derive(Debug, Clone, Default)]
pub struct InMemoryClaimHistory {
    claims: Vec<ClaimRecord>,
}

impl InMemoryClaimHistory {
    pub fn new(claims: Vec<ClaimRecord>) -> Self {
        Self { claims }
    }
}

impl DomainPort for InMemoryClaimHistory {}

#[async_trait]
impl HealthCheckable for InMemoryClaimHistory {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-claim-history")
    }
}

#[async_trait]
impl ClaimHistory for InMemoryClaimHistory {
    async fn claims_for_claimant(
        &self,
        claimant_id: &ClaimantId,
        _metadata: &OperationMetadata,
    ) -> Result<Vec<ClaimRecord>, PortError> {
        let wanted = EntityKey::claimant(claimant_id);
        Ok(self
            .claims
            .iter()
            .filter(|c| wanted.is_some() && EntityKey::claimant(&c.claimant_id) == wanted)
            .cloned()
            .collect())
    }
}
