//! Pattern Evaluator
//!
//! Queries the historical fraud-case index with the claim's search text and
//! turns every sufficiently similar case into a pattern-match finding whose
//! confidence is the similarity score. Several hits on the same historical
//! case collapse into one finding carrying the best similarity.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use core_kernel::CaseId;

use crate::config::PatternConfig;
use crate::error::EvaluatorError;
use crate::evaluator::{EvaluationContext, SignalEvaluator};
use crate::indicator::{Evidence, SignalCategory};
use crate::normalizer::RawFinding;
use crate::ports::{HistoricalMatch, PatternIndex};

/// Signal name of every pattern-match finding
pub const PATTERN_SIGNAL: &str = "pattern_match";

/// Evaluator matching claims against historical fraud cases
pub struct PatternEvaluator {
    config: PatternConfig,
    index: Arc<dyn PatternIndex>,
}

impl PatternEvaluator {
    pub fn new(config: PatternConfig, index: Arc<dyn PatternIndex>) -> Self {
        Self { config, index }
    }

    /// Dedupes matches by case and keeps those at or above the threshold.
    ///
    /// Non-finite similarities are passed through so the normalizer reports
    /// them as signal losses instead of silently discarding them.
    pub fn select_matches(&self, matches: Vec<HistoricalMatch>) -> Vec<HistoricalMatch> {
        let mut best: BTreeMap<CaseId, HistoricalMatch> = BTreeMap::new();
        let mut malformed = Vec::new();

        for m in matches {
            if !m.similarity.is_finite() {
                malformed.push(m);
                continue;
            }
            match best.get(&m.case_id) {
                Some(existing) if existing.similarity >= m.similarity => {}
                _ => {
                    best.insert(m.case_id.clone(), m);
                }
            }
        }

        let mut selected: Vec<HistoricalMatch> = best
            .into_values()
            .filter(|m| m.similarity >= self.config.similarity_threshold)
            .collect();
        selected.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.case_id.cmp(&b.case_id))
        });
        selected.extend(malformed);
        selected
    }

    fn to_finding(m: HistoricalMatch) -> RawFinding {
        let rationale = if m.summary.trim().is_empty() {
            format!("matches historical fraud case {}", m.case_id)
        } else {
            m.summary
        };
        RawFinding::new(PATTERN_SIGNAL, m.similarity, rationale)
            .with_evidence(Evidence::HistoricalCase {
                case_id: m.case_id.clone(),
            })
            .with_case(m.case_id)
    }
}

#[async_trait]
impl SignalEvaluator for PatternEvaluator {
    fn category(&self) -> SignalCategory {
        SignalCategory::PatternMatch
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> Result<Vec<RawFinding>, EvaluatorError> {
        let query = ctx.claim.search_text();
        let matches = self
            .index
            .retrieve(&query, self.config.top_k, &ctx.metadata)
            .await
            .map_err(|e| {
                warn!(claim_id = %ctx.claim.claim_id, error = %e, "Pattern retrieval failed");
                EvaluatorError::from_port(self.category(), e)
            })?;

        let retrieved = matches.len();
        let findings: Vec<RawFinding> = self
            .select_matches(matches)
            .into_iter()
            .map(Self::to_finding)
            .collect();

        debug!(
            claim_id = %ctx.claim.claim_id,
            retrieved,
            matched = findings.len(),
            "Pattern retrieval complete"
        );
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError};

    struct Unused;

    impl DomainPort for Unused {}

    #[async_trait]
    impl HealthCheckable for Unused {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("unused")
        }
    }

    #[async_trait]
    impl PatternIndex for Unused {
        async fn retrieve(
            &self,
            _query_text: &str,
            _k: usize,
            _metadata: &OperationMetadata,
        ) -> Result<Vec<HistoricalMatch>, PortError> {
            Ok(Vec::new())
        }
    }

    fn evaluator() -> PatternEvaluator {
        PatternEvaluator::new(PatternConfig::default(), Arc::new(Unused))
    }

    #[test]
    fn test_dedupes_by_case_keeping_best_similarity() {
        let selected = evaluator().select_matches(vec![
            HistoricalMatch::new("CASE-1", 0.65, "staged accident"),
            HistoricalMatch::new("CASE-2", 0.7, "rent-a-crash"),
            HistoricalMatch::new("CASE-1", 0.8, "staged accident"),
        ]);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].case_id, CaseId::new("CASE-1"));
        assert_eq!(selected[0].similarity, 0.8);
    }

    #[test]
    fn test_threshold_filters_weak_matches() {
        let selected = evaluator().select_matches(vec![
            HistoricalMatch::new("CASE-1", 0.59, "weak"),
            HistoricalMatch::new("CASE-2", 0.6, "at threshold"),
        ]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].case_id, CaseId::new("CASE-2"));
    }

    #[test]
    fn test_non_finite_similarity_passes_through() {
        let selected = evaluator().select_matches(vec![HistoricalMatch::new(
            "CASE-9",
            f64::NAN,
            "broken",
        )]);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_finding_carries_case_and_summary() {
        let finding = PatternEvaluator::to_finding(HistoricalMatch::new("CASE-3", 0.75, ""));
        assert_eq!(finding.case_id, Some(CaseId::new("CASE-3")));
        assert!(finding.rationale.contains("CASE-3"));
        assert_eq!(finding.confidence, 0.75);
    }
}
