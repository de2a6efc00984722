//! Evaluator contract

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::OperationMetadata;
use domain_claims::ClaimRecord;

use crate::error::EvaluatorError;
use crate::indicator::SignalCategory;
use crate::normalizer::RawFinding;
use crate::photo::PhotoUpload;

/// Inputs shared by every evaluator of one run
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub claim: Arc<ClaimRecord>,
    pub photos: Arc<Vec<PhotoUpload>>,
    pub metadata: OperationMetadata,
}

impl EvaluationContext {
    pub fn new(claim: ClaimRecord) -> Self {
        Self {
            claim: Arc::new(claim),
            photos: Arc::new(Vec::new()),
            metadata: OperationMetadata::default(),
        }
    }

    pub fn with_photos(mut self, photos: Vec<PhotoUpload>) -> Self {
        self.photos = Arc::new(photos);
        self
    }

    pub fn with_metadata(mut self, metadata: OperationMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// An independent producer of raw findings for one signal category
#[async_trait]
pub trait SignalEvaluator: Send + Sync {
    /// Category every finding of this evaluator belongs to
    fn category(&self) -> SignalCategory;

    /// Evaluates a claim
    ///
    /// An empty result means nothing suspicious was found. Collaborator
    /// failures are returned as `EvaluatorError` and classified by the
    /// orchestrator.
    async fn evaluate(&self, ctx: &EvaluationContext) -> Result<Vec<RawFinding>, EvaluatorError>;
}

/// A signal category that could not contribute to an assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftSignalFailure {
    pub category: SignalCategory,
    pub reason: String,
    /// True when the evaluator exceeded its timeout
    pub timed_out: bool,
}

impl SoftSignalFailure {
    pub fn new(category: SignalCategory, reason: impl Into<String>) -> Self {
        Self {
            category,
            reason: reason.into(),
            timed_out: false,
        }
    }

    pub fn timeout(category: SignalCategory, timeout_ms: u64) -> Self {
        Self {
            category,
            reason: format!("evaluator timed out after {}ms", timeout_ms),
            timed_out: true,
        }
    }
}
