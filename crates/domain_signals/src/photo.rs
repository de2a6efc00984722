//! Photo authenticity consumption
//!
//! The analyzer collaborator scores each photo on five heuristics. This
//! evaluator combines them into an overall authenticity score and emits one
//! finding per heuristic that crossed its threshold, plus a
//! `low_authenticity` finding for photos that are not authentic overall.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::PhotoConfig;
use crate::error::EvaluatorError;
use crate::evaluator::{EvaluationContext, SignalEvaluator};
use crate::indicator::{Evidence, PhotoCheck, SignalCategory};
use crate::normalizer::RawFinding;
use crate::ports::{PhotoAnalyzer, PhotoAuthenticityReport};

/// Photo bytes submitted with a claim
#[derive(Clone)]
pub struct PhotoUpload {
    pub reference: String,
    pub bytes: Arc<[u8]>,
}

impl PhotoUpload {
    pub fn new(reference: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            reference: reference.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("reference", &self.reference)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Overall authenticity of a photo in `[0, 1]`
pub fn authenticity_score(report: &PhotoAuthenticityReport, config: &PhotoConfig) -> f64 {
    let w = &config.weights;
    let score = 1.0 - w.ai_generated * report.ai_generated_probability
        - w.manipulation * report.manipulation_detected
        - w.metadata * report.metadata_tampering
        + w.consistency * report.consistency_score
        - w.duplicates * report.duplicate_detection;
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Evaluator consuming photo authenticity reports
pub struct PhotoAuthenticityEvaluator {
    config: PhotoConfig,
    analyzer: Arc<dyn PhotoAnalyzer>,
}

impl PhotoAuthenticityEvaluator {
    pub fn new(config: PhotoConfig, analyzer: Arc<dyn PhotoAnalyzer>) -> Self {
        Self { config, analyzer }
    }

    /// Converts one report into findings
    pub fn findings_for(&self, reference: &str, report: &PhotoAuthenticityReport) -> Vec<RawFinding> {
        let threshold = self.config.heuristic_threshold;
        let heuristics = [
            (
                PhotoCheck::AiGenerated,
                report.ai_generated_probability,
                "AI-generated content probability",
            ),
            (
                PhotoCheck::Manipulation,
                report.manipulation_detected,
                "pixel-level manipulation",
            ),
            (
                PhotoCheck::MetadataTampering,
                report.metadata_tampering,
                "EXIF metadata tampering",
            ),
            (
                PhotoCheck::LightingInconsistency,
                1.0 - report.consistency_score,
                "lighting and shadow inconsistency",
            ),
            (
                PhotoCheck::DuplicateRegions,
                report.duplicate_detection,
                "duplicated image regions",
            ),
        ];

        let evidence = Evidence::Photo {
            reference: reference.to_string(),
        };
        let mut findings: Vec<RawFinding> = heuristics
            .into_iter()
            // NaN scores fall through to the normalizer
            .filter(|(_, score, _)| !(*score <= threshold))
            .map(|(check, score, label)| {
                RawFinding::new(
                    check.as_signal(),
                    score,
                    format!("{}: {} scored {:.2}", reference, label, score),
                )
                .with_evidence(evidence.clone())
            })
            .collect();

        let authenticity = authenticity_score(report, &self.config);
        if authenticity <= self.config.authentic_threshold {
            findings.push(
                RawFinding::new(
                    PhotoCheck::LowAuthenticity.as_signal(),
                    1.0 - authenticity,
                    format!(
                        "{}: overall authenticity {:.2} is at or below {:.2}",
                        reference, authenticity, self.config.authentic_threshold
                    ),
                )
                .with_evidence(evidence),
            );
        }
        findings
    }
}

#[async_trait]
impl SignalEvaluator for PhotoAuthenticityEvaluator {
    fn category(&self) -> SignalCategory {
        SignalCategory::PhotoAuthenticity
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> Result<Vec<RawFinding>, EvaluatorError> {
        let mut findings = Vec::new();
        for photo in ctx.photos.iter() {
            let report = self
                .analyzer
                .analyze(&photo.reference, &photo.bytes, &ctx.metadata)
                .await
                .map_err(|e| EvaluatorError::from_port(self.category(), e))?;
            findings.extend(self.findings_for(&photo.reference, &report));
        }

        debug!(
            claim_id = %ctx.claim.claim_id,
            photos = ctx.photos.len(),
            findings = findings.len(),
            "Photo authenticity analysis complete"
        );
        Ok(findings)
    }
}
