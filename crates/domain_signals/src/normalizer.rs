//! Signal Normalizer
//!
//! Evaluators and collaborators speak in loosely typed findings: a signal
//! name, a confidence of unknown quality, a rationale and an optional
//! evidence pointer. The normalizer is the boundary where those findings
//! become strictly typed `Indicator`s. It never fails a run: malformed findings
//! are dropped and reported as `PartialSignalLoss`, out-of-range confidences
//! are clamped and reported as `ConfidenceCorrection`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use core_kernel::CaseId;

use crate::config::SeverityThresholds;
use crate::indicator::{
    Evidence, InconsistencyKind, Indicator, IndicatorKind, PhotoCheck, SignalCategory,
};

/// A finding as emitted by an evaluator, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFinding {
    /// Signal name within the evaluator category (e.g. `timeline_order`)
    pub signal: String,
    pub confidence: f64,
    pub rationale: String,
    #[serde(default)]
    pub evidence: Evidence,
    /// Historical case reference, required for pattern matches
    #[serde(default)]
    pub case_id: Option<CaseId>,
}

impl RawFinding {
    pub fn new(signal: impl Into<String>, confidence: f64, rationale: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            confidence,
            rationale: rationale.into(),
            evidence: Evidence::Unspecified,
            case_id: None,
        }
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_case(mut self, case_id: CaseId) -> Self {
        self.case_id = Some(case_id);
        self
    }
}

/// A finding dropped during normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSignalLoss {
    pub category: SignalCategory,
    /// Position of the finding in the evaluator output
    pub index: usize,
    pub reason: String,
}

/// A confidence clamped into `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceCorrection {
    pub category: SignalCategory,
    pub index: usize,
    pub original: f64,
    pub corrected: f64,
}

/// Output of one normalization pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSignals {
    pub category: SignalCategory,
    pub indicators: Vec<Indicator>,
    pub losses: Vec<PartialSignalLoss>,
    pub corrections: Vec<ConfidenceCorrection>,
}

impl NormalizedSignals {
    fn empty(category: SignalCategory) -> Self {
        Self {
            category,
            indicators: Vec::new(),
            losses: Vec::new(),
            corrections: Vec::new(),
        }
    }

    fn lose(&mut self, index: usize, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(
            category = %self.category,
            index,
            reason = %reason,
            "Dropped malformed finding"
        );
        self.losses.push(PartialSignalLoss {
            category: self.category,
            index,
            reason,
        });
    }
}

/// Converts raw evaluator output into indicators
#[derive(Debug, Clone, Default)]
pub struct SignalNormalizer {
    thresholds: SeverityThresholds,
}

impl SignalNormalizer {
    pub fn new(thresholds: SeverityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }

    /// Normalizes findings produced by the evaluator of `category`
    pub fn normalize(&self, findings: Vec<RawFinding>, category: SignalCategory) -> NormalizedSignals {
        let mut out = NormalizedSignals::empty(category);

        for (index, finding) in findings.into_iter().enumerate() {
            if !finding.confidence.is_finite() {
                out.lose(index, format!("confidence is not a number: {}", finding.confidence));
                continue;
            }
            if finding.rationale.trim().is_empty() {
                out.lose(index, format!("finding '{}' has no rationale", finding.signal));
                continue;
            }
            let Some(kind) = Self::resolve_kind(&finding, category) else {
                out.lose(
                    index,
                    format!("unknown {} signal '{}'", category, finding.signal),
                );
                continue;
            };

            let confidence = finding.confidence.clamp(0.0, 1.0);
            if confidence != finding.confidence {
                warn!(
                    category = %category,
                    index,
                    original = finding.confidence,
                    corrected = confidence,
                    "Clamped out-of-range confidence"
                );
                out.corrections.push(ConfidenceCorrection {
                    category,
                    index,
                    original: finding.confidence,
                    corrected: confidence,
                });
            }

            let severity = self.thresholds.severity_for(confidence);
            match Indicator::new(kind, confidence, severity, finding.evidence, finding.rationale) {
                Ok(indicator) => {
                    debug!(
                        category = %category,
                        severity = ?indicator.severity(),
                        confidence = indicator.confidence(),
                        "Normalized indicator"
                    );
                    out.indicators.push(indicator);
                }
                Err(e) => out.lose(index, e.to_string()),
            }
        }

        out
    }

    /// Normalizes untyped findings, e.g. JSON returned by a remote evaluator
    pub fn normalize_json(&self, findings: Vec<Value>, category: SignalCategory) -> NormalizedSignals {
        let mut parsed = Vec::with_capacity(findings.len());
        let mut parse_losses = Vec::new();

        for (index, value) in findings.into_iter().enumerate() {
            match serde_json::from_value::<RawFinding>(value) {
                Ok(finding) => parsed.push((index, finding)),
                Err(e) => parse_losses.push((index, format!("unparseable finding: {}", e))),
            }
        }

        let (positions, raw): (Vec<usize>, Vec<RawFinding>) = parsed.into_iter().unzip();
        let mut out = self.normalize(raw, category);

        // Report positions relative to the untyped input
        for loss in &mut out.losses {
            loss.index = positions[loss.index];
        }
        for correction in &mut out.corrections {
            correction.index = positions[correction.index];
        }
        for (index, reason) in parse_losses {
            out.lose(index, reason);
        }
        out.losses.sort_by_key(|loss| loss.index);
        out
    }

    fn resolve_kind(finding: &RawFinding, category: SignalCategory) -> Option<IndicatorKind> {
        match category {
            SignalCategory::Inconsistency => InconsistencyKind::from_signal(&finding.signal)
                .map(|check| IndicatorKind::Inconsistency { check }),
            SignalCategory::PatternMatch => finding
                .case_id
                .clone()
                .filter(|case_id| !case_id.is_blank())
                .map(|case_id| IndicatorKind::PatternMatch { case_id }),
            SignalCategory::PhotoAuthenticity => PhotoCheck::from_signal(&finding.signal)
                .map(|check| IndicatorKind::PhotoAuthenticity { check }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::Severity;
    use serde_json::json;

    #[test]
    fn test_assigns_severity_from_thresholds() {
        let normalizer = SignalNormalizer::default();
        let out = normalizer.normalize(
            vec![
                RawFinding::new("timeline_order", 0.95, "report precedes incident"),
                RawFinding::new("suspicious_language", 0.4, "sales pressure wording"),
            ],
            SignalCategory::Inconsistency,
        );
        assert_eq!(out.indicators.len(), 2);
        assert_eq!(out.indicators[0].severity(), Severity::Critical);
        assert_eq!(out.indicators[1].severity(), Severity::Medium);
        assert!(out.losses.is_empty());
    }

    #[test]
    fn test_clamps_and_records_correction() {
        let out = SignalNormalizer::default().normalize(
            vec![RawFinding::new("ai_generated", 1.4, "synthetic texture")],
            SignalCategory::PhotoAuthenticity,
        );
        assert_eq!(out.indicators[0].confidence(), 1.0);
        assert_eq!(out.corrections.len(), 1);
        assert_eq!(out.corrections[0].original, 1.4);
    }

    #[test]
    fn test_malformed_findings_become_losses() {
        let out = SignalNormalizer::default().normalize(
            vec![
                RawFinding::new("timeline_order", f64::NAN, "x"),
                RawFinding::new("made_up_signal", 0.5, "x"),
                RawFinding::new("timeline_order", 0.5, " "),
                RawFinding::new("round_amounts", 0.5, "three round amounts"),
            ],
            SignalCategory::Inconsistency,
        );
        assert_eq!(out.indicators.len(), 1);
        let lost: Vec<usize> = out.losses.iter().map(|l| l.index).collect();
        assert_eq!(lost, vec![0, 1, 2]);
    }

    #[test]
    fn test_pattern_match_requires_case_id() {
        let out = SignalNormalizer::default().normalize(
            vec![
                RawFinding::new("pattern_match", 0.8, "staged accident"),
                RawFinding::new("pattern_match", 0.8, "staged accident")
                    .with_case(CaseId::new("CASE-1")),
            ],
            SignalCategory::PatternMatch,
        );
        assert_eq!(out.indicators.len(), 1);
        assert_eq!(out.losses.len(), 1);
    }

    #[test]
    fn test_normalize_json_reports_original_positions() {
        let out = SignalNormalizer::default().normalize_json(
            vec![
                json!({"signal": "manipulation"}),
                json!({"signal": "bogus", "confidence": 0.7, "rationale": "r"}),
                json!({"signal": "manipulation", "confidence": -0.2, "rationale": "edges"}),
            ],
            SignalCategory::PhotoAuthenticity,
        );
        assert_eq!(out.indicators.len(), 1);
        assert_eq!(out.indicators[0].confidence(), 0.0);
        assert_eq!(out.corrections[0].index, 2);
        let lost: Vec<usize> = out.losses.iter().map(|l| l.index).collect();
        assert_eq!(lost, vec![0, 1]);
    }
}
