//! Signal and scoring configuration
//!
//! Every business constant used by the normalizer, the evaluators and the
//! scoring engine lives here. All sections deserialize with defaults so a
//! partial configuration file only overrides what it names, and every section
//! is validated once at engine construction.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::CoreError;
use domain_claims::ClaimCategory;

use crate::indicator::{SignalCategory, Severity};

fn ensure_weight(name: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::configuration(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn ensure_positive(name: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::configuration(format!(
            "{} must be a finite positive number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn ensure_unit(name: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CoreError::configuration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Confidence to severity threshold table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            medium: 0.35,
            high: 0.6,
            critical: 0.85,
        }
    }
}

impl SeverityThresholds {
    /// Maps a confidence in `[0, 1]` to a severity
    pub fn severity_for(&self, confidence: f64) -> Severity {
        if confidence >= self.critical {
            Severity::Critical
        } else if confidence >= self.high {
            Severity::High
        } else if confidence >= self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("severity.medium", self.medium),
            ("severity.high", self.high),
            ("severity.critical", self.critical),
        ] {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(CoreError::configuration(format!(
                    "{} must be within (0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(self.medium < self.high && self.high < self.critical) {
            return Err(CoreError::configuration(
                "severity thresholds must be strictly ascending: medium < high < critical",
            ));
        }
        Ok(())
    }
}

/// Weight applied to `confidence` per severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            low: 0.25,
            medium: 0.5,
            high: 0.75,
            critical: 1.0,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }
}

/// Weight applied to each evaluator category's raw sum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub inconsistency: f64,
    pub pattern_match: f64,
    pub photo_authenticity: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            inconsistency: 1.0,
            pattern_match: 1.0,
            photo_authenticity: 0.8,
        }
    }
}

impl CategoryWeights {
    pub fn weight(&self, category: SignalCategory) -> f64 {
        match category {
            SignalCategory::Inconsistency => self.inconsistency,
            SignalCategory::PatternMatch => self.pattern_match,
            SignalCategory::PhotoAuthenticity => self.photo_authenticity,
        }
    }
}

/// Lower fraud-score boundaries of each risk level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 25.0,
            high: 55.0,
            critical: 80.0,
        }
    }
}

/// Risk scoring engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub severity_weights: SeverityWeights,
    pub category_weights: CategoryWeights,
    /// Maximum weighted contribution of a single category
    pub category_cap: f64,
    /// Saturation constant of `100 * (1 - exp(-sum / normalizer))`
    pub normalizer: f64,
    pub risk_thresholds: RiskThresholds,
    /// Confidence at which a critical indicator forces at least "investigate"
    pub override_confidence: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            severity_weights: SeverityWeights::default(),
            category_weights: CategoryWeights::default(),
            category_cap: 1.5,
            normalizer: 2.0,
            risk_thresholds: RiskThresholds::default(),
            override_confidence: 0.9,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        let sw = &self.severity_weights;
        ensure_weight("scoring.severity_weights.low", sw.low)?;
        ensure_weight("scoring.severity_weights.medium", sw.medium)?;
        ensure_weight("scoring.severity_weights.high", sw.high)?;
        ensure_weight("scoring.severity_weights.critical", sw.critical)?;

        let cw = &self.category_weights;
        ensure_weight("scoring.category_weights.inconsistency", cw.inconsistency)?;
        ensure_weight("scoring.category_weights.pattern_match", cw.pattern_match)?;
        ensure_weight("scoring.category_weights.photo_authenticity", cw.photo_authenticity)?;

        ensure_positive("scoring.category_cap", self.category_cap)?;
        ensure_positive("scoring.normalizer", self.normalizer)?;
        ensure_unit("scoring.override_confidence", self.override_confidence)?;

        let rt = &self.risk_thresholds;
        for (name, value) in [
            ("scoring.risk_thresholds.medium", rt.medium),
            ("scoring.risk_thresholds.high", rt.high),
            ("scoring.risk_thresholds.critical", rt.critical),
        ] {
            if !value.is_finite() || value <= 0.0 || value >= 100.0 {
                return Err(CoreError::configuration(format!(
                    "{} must be within (0, 100), got {}",
                    name, value
                )));
            }
        }
        if !(rt.medium < rt.high && rt.high < rt.critical) {
            return Err(CoreError::configuration(
                "risk thresholds must be strictly ascending: medium < high < critical",
            ));
        }
        Ok(())
    }
}

/// Inconsistency evaluator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InconsistencyConfig {
    pub timeline_confidence: f64,
    pub overlap_confidence: f64,
    pub narrative_date_confidence: f64,
    pub narrative_total_confidence: f64,
    pub suspicious_language_confidence: f64,
    pub round_amount_confidence: f64,
    /// Multiple of the category ceiling above which an amount is flagged
    pub ceiling_multiple: Decimal,
    /// Historical amount ceiling per claim category, keyed by category name
    pub category_ceilings: BTreeMap<String, Decimal>,
    /// Relative tolerance between a narrative total and the claimed amount
    pub total_tolerance: Decimal,
    pub suspicious_keywords: Vec<String>,
    /// Number of whole-dollar amounts that makes a narrative suspicious
    pub round_amount_min: usize,
}

impl Default for InconsistencyConfig {
    fn default() -> Self {
        let category_ceilings = [
            (ClaimCategory::AutoCollision, dec!(25000)),
            (ClaimCategory::AutoTheft, dec!(60000)),
            (ClaimCategory::RentalVehicle, dec!(15000)),
            (ClaimCategory::PropertyDamage, dec!(100000)),
            (ClaimCategory::Theft, dec!(20000)),
            (ClaimCategory::Medical, dec!(50000)),
            (ClaimCategory::Liability, dec!(250000)),
            (ClaimCategory::Other, dec!(20000)),
        ]
        .into_iter()
        .map(|(category, ceiling)| (category.as_str().to_string(), ceiling))
        .collect();

        Self {
            timeline_confidence: 0.95,
            overlap_confidence: 0.8,
            narrative_date_confidence: 0.75,
            narrative_total_confidence: 0.7,
            suspicious_language_confidence: 0.4,
            round_amount_confidence: 0.5,
            ceiling_multiple: dec!(3),
            category_ceilings,
            total_tolerance: dec!(0.01),
            suspicious_keywords: ["guaranteed", "no risk", "100% safe", "act now", "limited time"]
                .into_iter()
                .map(String::from)
                .collect(),
            round_amount_min: 3,
        }
    }
}

impl InconsistencyConfig {
    /// Ceiling for a category, if one is configured
    pub fn ceiling_for(&self, category: ClaimCategory) -> Option<Decimal> {
        self.category_ceilings.get(category.as_str()).copied()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        ensure_unit("inconsistency.timeline_confidence", self.timeline_confidence)?;
        ensure_unit("inconsistency.overlap_confidence", self.overlap_confidence)?;
        ensure_unit("inconsistency.narrative_date_confidence", self.narrative_date_confidence)?;
        ensure_unit("inconsistency.narrative_total_confidence", self.narrative_total_confidence)?;
        ensure_unit(
            "inconsistency.suspicious_language_confidence",
            self.suspicious_language_confidence,
        )?;
        ensure_unit("inconsistency.round_amount_confidence", self.round_amount_confidence)?;

        if self.ceiling_multiple < Decimal::ONE {
            return Err(CoreError::configuration(format!(
                "inconsistency.ceiling_multiple must be at least 1, got {}",
                self.ceiling_multiple
            )));
        }
        if let Some(name) = self
            .category_ceilings
            .keys()
            .find(|name| name.parse::<ClaimCategory>().is_err())
        {
            return Err(CoreError::configuration(format!(
                "inconsistency.category_ceilings.{} is not a claim category",
                name
            )));
        }
        if let Some((name, ceiling)) = self
            .category_ceilings
            .iter()
            .find(|(_, ceiling)| **ceiling <= Decimal::ZERO)
        {
            return Err(CoreError::configuration(format!(
                "inconsistency.category_ceilings.{} must be positive, got {}",
                name, ceiling
            )));
        }
        if self.total_tolerance < Decimal::ZERO {
            return Err(CoreError::configuration(
                "inconsistency.total_tolerance must not be negative",
            ));
        }
        if self.round_amount_min == 0 {
            return Err(CoreError::configuration(
                "inconsistency.round_amount_min must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Pattern evaluator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Number of historical cases retrieved per claim
    pub top_k: usize,
    /// Minimum similarity for a match to become an indicator
    pub similarity_threshold: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.6,
        }
    }
}

impl PatternConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.top_k == 0 {
            return Err(CoreError::configuration("pattern.top_k must be at least 1"));
        }
        ensure_unit("pattern.similarity_threshold", self.similarity_threshold)
    }
}

/// Weights of the overall photo authenticity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticityWeights {
    pub ai_generated: f64,
    pub manipulation: f64,
    pub metadata: f64,
    pub consistency: f64,
    pub duplicates: f64,
}

impl Default for AuthenticityWeights {
    fn default() -> Self {
        Self {
            ai_generated: 0.4,
            manipulation: 0.3,
            metadata: 0.2,
            consistency: 0.5,
            duplicates: 0.2,
        }
    }
}

/// Photo authenticity consumer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// A heuristic above this score is reported (below it for consistency)
    pub heuristic_threshold: f64,
    /// Overall authenticity above which a photo is considered authentic
    pub authentic_threshold: f64,
    pub weights: AuthenticityWeights,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            heuristic_threshold: 0.5,
            authentic_threshold: 0.7,
            weights: AuthenticityWeights::default(),
        }
    }
}

impl PhotoConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        ensure_unit("photo.heuristic_threshold", self.heuristic_threshold)?;
        ensure_unit("photo.authentic_threshold", self.authentic_threshold)?;
        let w = &self.weights;
        ensure_weight("photo.weights.ai_generated", w.ai_generated)?;
        ensure_weight("photo.weights.manipulation", w.manipulation)?;
        ensure_weight("photo.weights.metadata", w.metadata)?;
        ensure_weight("photo.weights.consistency", w.consistency)?;
        ensure_weight("photo.weights.duplicates", w.duplicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SeverityThresholds::default().validate().is_ok());
        assert!(ScoringConfig::default().validate().is_ok());
        assert!(InconsistencyConfig::default().validate().is_ok());
        assert!(PatternConfig::default().validate().is_ok());
        assert!(PhotoConfig::default().validate().is_ok());
    }

    #[test]
    fn test_severity_for_boundaries() {
        let t = SeverityThresholds::default();
        assert_eq!(t.severity_for(0.0), Severity::Low);
        assert_eq!(t.severity_for(0.34), Severity::Low);
        assert_eq!(t.severity_for(0.35), Severity::Medium);
        assert_eq!(t.severity_for(0.6), Severity::High);
        assert_eq!(t.severity_for(0.85), Severity::Critical);
        assert_eq!(t.severity_for(1.0), Severity::Critical);
    }

    #[test]
    fn test_non_ascending_thresholds_rejected() {
        let t = SeverityThresholds {
            medium: 0.6,
            high: 0.6,
            critical: 0.9,
        };
        assert!(t.validate().unwrap_err().is_configuration());

        let mut scoring = ScoringConfig::default();
        scoring.risk_thresholds.high = 90.0;
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut scoring = ScoringConfig::default();
        scoring.category_weights.pattern_match = -1.0;
        assert!(scoring.validate().is_err());

        let mut scoring = ScoringConfig::default();
        scoring.normalizer = 0.0;
        assert!(scoring.validate().is_err());

        let mut scoring = ScoringConfig::default();
        scoring.severity_weights.high = f64::NAN;
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_inconsistency_rules() {
        let mut config = InconsistencyConfig::default();
        config.ceiling_multiple = dec!(0.5);
        assert!(config.validate().is_err());

        let config = InconsistencyConfig::default();
        assert_eq!(config.ceiling_for(ClaimCategory::Medical), Some(dec!(50000)));
    }

    #[test]
    fn test_misspelled_ceiling_category_rejected() {
        let mut config = InconsistencyConfig::default();
        config.category_ceilings.insert("auto_colision".to_string(), dec!(25000));

        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("auto_colision"));
    }

    #[test]
    fn test_partial_section_deserializes_with_defaults() {
        let config: PatternConfig = serde_json::from_str(r#"{"top_k": 3}"#).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.similarity_threshold, 0.6);
    }
}
