//! Risk Scoring Engine
//!
//! Aggregates indicators into a single fraud score. The engine is a pure
//! function of the indicator set and its configuration:
//!
//! ```text
//! raw(c)    = Σ severity_weight(i.severity) * i.confidence   for i in category c
//! capped(c) = min(category_weight(c) * raw(c), category_cap)
//! score     = 100 * (1 - exp(-Σ capped(c) / normalizer))
//! ```
//!
//! Sums are taken per category in a fixed category order over indicators in
//! canonical order, so the result does not depend on the order evaluators
//! finished in. The per-category cap keeps one evaluator from saturating the
//! score alone.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::CoreError;

use crate::config::ScoringConfig;
use crate::indicator::{order_indicators, Indicator, Severity, SignalCategory};

/// Risk level derived from the fraud score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    /// Signal collection failed; the score cannot be relied on
    Indeterminate,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
            RiskLevel::Indeterminate => "indeterminate",
        };
        f.write_str(s)
    }
}

/// Recommended action, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Approve,
    Review,
    Investigate,
    Deny,
}

impl Recommendation {
    /// Deterministic mapping from risk level
    pub fn for_risk(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Recommendation::Approve,
            RiskLevel::Medium => Recommendation::Review,
            RiskLevel::High => Recommendation::Investigate,
            RiskLevel::Critical => Recommendation::Deny,
            RiskLevel::Indeterminate => Recommendation::Review,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Approve => "approve",
            Recommendation::Review => "review",
            Recommendation::Investigate => "investigate",
            Recommendation::Deny => "deny",
        };
        f.write_str(s)
    }
}

/// Contribution of one signal category to the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryContribution {
    pub category: SignalCategory,
    pub indicator_count: usize,
    /// Σ severity_weight * confidence
    pub raw: f64,
    /// raw * category weight
    pub weighted: f64,
    /// weighted, limited to the category cap
    pub capped: f64,
}

/// Audit trail of a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScoreBreakdown {
    pub categories: Vec<CategoryContribution>,
    pub severity_counts: BTreeMap<Severity, usize>,
    /// Σ capped contributions fed into the saturating function
    pub total_weight: f64,
}

impl ScoreBreakdown {
    pub fn count(&self, severity: Severity) -> usize {
        self.severity_counts.get(&severity).copied().unwrap_or(0)
    }
}

/// Result of scoring an indicator set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Fraud score in `[0, 100]`, rounded to two decimals
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
    pub breakdown: ScoreBreakdown,
    /// True when a high-confidence critical indicator raised the recommendation
    pub override_applied: bool,
}

/// The risk scoring engine
#[derive(Debug, Clone)]
pub struct RiskScoringEngine {
    config: ScoringConfig,
}

impl RiskScoringEngine {
    /// Creates an engine, rejecting invalid configuration
    pub fn new(config: ScoringConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Maps a fraud score to its risk level
    pub fn risk_level(&self, fraud_score: f64) -> RiskLevel {
        let t = &self.config.risk_thresholds;
        if fraud_score >= t.critical {
            RiskLevel::Critical
        } else if fraud_score >= t.high {
            RiskLevel::High
        } else if fraud_score >= t.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Scores an indicator set
    pub fn score(&self, indicators: &[Indicator]) -> ScoreOutcome {
        let ordered = order_indicators(indicators.to_vec());

        let mut severity_counts = BTreeMap::new();
        for indicator in &ordered {
            *severity_counts.entry(indicator.severity()).or_insert(0) += 1;
        }

        let categories: Vec<CategoryContribution> = SignalCategory::ALL
            .into_iter()
            .map(|category| self.contribution(category, &ordered))
            .collect();
        let total_weight: f64 = categories.iter().map(|c| c.capped).sum();

        let fraud_score = self.normalize(total_weight);
        let risk_level = self.risk_level(fraud_score);
        let mapped = Recommendation::for_risk(risk_level);

        let forces_investigation = ordered.iter().any(|i| {
            i.severity() == Severity::Critical && i.confidence() >= self.config.override_confidence
        });
        let (recommendation, override_applied) =
            if forces_investigation && mapped < Recommendation::Investigate {
                (Recommendation::Investigate, true)
            } else {
                (mapped, false)
            };

        debug!(
            fraud_score,
            risk_level = %risk_level,
            recommendation = %recommendation,
            override_applied,
            indicators = ordered.len(),
            "Scored indicators"
        );

        ScoreOutcome {
            fraud_score,
            risk_level,
            recommendation,
            breakdown: ScoreBreakdown {
                categories,
                severity_counts,
                total_weight,
            },
            override_applied,
        }
    }

    fn contribution(&self, category: SignalCategory, ordered: &[Indicator]) -> CategoryContribution {
        let weights = &self.config.severity_weights;
        let (indicator_count, raw) = ordered
            .iter()
            .filter(|i| i.category() == category)
            .fold((0usize, 0.0f64), |(n, sum), i| {
                (n + 1, sum + weights.weight(i.severity()) * i.confidence())
            });
        let weighted = raw * self.config.category_weights.weight(category);
        CategoryContribution {
            category,
            indicator_count,
            raw,
            weighted,
            capped: weighted.min(self.config.category_cap),
        }
    }

    /// Saturating map of a total weight onto `[0, 100]`
    pub fn normalize(&self, total_weight: f64) -> f64 {
        let score = 100.0 * (1.0 - (-total_weight / self.config.normalizer).exp());
        ((score * 100.0).round() / 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::{Evidence, IndicatorKind, InconsistencyKind, PhotoCheck};

    fn engine() -> RiskScoringEngine {
        RiskScoringEngine::new(ScoringConfig::default()).unwrap()
    }

    fn inconsistency(severity: Severity, confidence: f64) -> Indicator {
        Indicator::new(
            IndicatorKind::Inconsistency {
                check: InconsistencyKind::TimelineOrder,
            },
            confidence,
            severity,
            Evidence::Unspecified,
            "report precedes incident",
        )
        .unwrap()
    }

    #[test]
    fn test_no_indicators_is_low_approve() {
        let outcome = engine().score(&[]);
        assert_eq!(outcome.fraud_score, 0.0);
        assert_eq!(outcome.risk_level, RiskLevel::Low);
        assert_eq!(outcome.recommendation, Recommendation::Approve);
        assert!(!outcome.override_applied);
    }

    #[test]
    fn test_single_critical_indicator_forces_investigate() {
        let outcome = engine().score(&[inconsistency(Severity::Critical, 0.95)]);
        // 100 * (1 - e^-0.475) = 37.81
        assert_eq!(outcome.fraud_score, 37.81);
        assert_eq!(outcome.risk_level, RiskLevel::Medium);
        assert_eq!(outcome.recommendation, Recommendation::Investigate);
        assert!(outcome.override_applied);
    }

    #[test]
    fn test_category_cap_limits_single_evaluator() {
        let many: Vec<Indicator> = (0..20).map(|_| inconsistency(Severity::Critical, 1.0)).collect();
        let outcome = engine().score(&many);
        assert_eq!(outcome.breakdown.categories[0].capped, 1.5);
        // 100 * (1 - e^-0.75) = 52.76, still short of "high"
        assert_eq!(outcome.fraud_score, 52.76);
        assert_eq!(outcome.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_photo_category_weight_applies() {
        let photo = Indicator::new(
            IndicatorKind::PhotoAuthenticity {
                check: PhotoCheck::AiGenerated,
            },
            0.5,
            Severity::Medium,
            Evidence::Unspecified,
            "synthetic",
        )
        .unwrap();
        let outcome = engine().score(&[photo]);
        let contribution = &outcome.breakdown.categories[2];
        assert_eq!(contribution.indicator_count, 1);
        assert!((contribution.raw - 0.25).abs() < 1e-12);
        assert!((contribution.weighted - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_risk_level_boundaries() {
        let e = engine();
        assert_eq!(e.risk_level(24.99), RiskLevel::Low);
        assert_eq!(e.risk_level(25.0), RiskLevel::Medium);
        assert_eq!(e.risk_level(54.99), RiskLevel::Medium);
        assert_eq!(e.risk_level(55.0), RiskLevel::High);
        assert_eq!(e.risk_level(79.99), RiskLevel::High);
        assert_eq!(e.risk_level(80.0), RiskLevel::Critical);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScoringConfig::default();
        config.normalizer = -1.0;
        assert!(RiskScoringEngine::new(config).is_err());
    }
}
