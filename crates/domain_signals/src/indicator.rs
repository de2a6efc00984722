//! Normalized fraud indicators
//!
//! Every signal the engine reasons about is an `Indicator`: a strictly typed
//! record naming the evaluator category that produced it, a confidence in
//! `[0, 1]`, a severity, an evidence pointer and a rationale. Indicators are
//! built by the signal normalizer at the evaluator boundary and are never
//! mutated afterwards.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use core_kernel::{CaseId, ClaimId};

use crate::error::SignalError;

/// Evaluator category an indicator belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Inconsistency,
    PatternMatch,
    PhotoAuthenticity,
}

impl SignalCategory {
    /// All categories in their canonical scoring order
    pub const ALL: [SignalCategory; 3] = [
        SignalCategory::Inconsistency,
        SignalCategory::PatternMatch,
        SignalCategory::PhotoAuthenticity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalCategory::Inconsistency => "inconsistency",
            SignalCategory::PatternMatch => "pattern_match",
            SignalCategory::PhotoAuthenticity => "photo_authenticity",
        }
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Logical or timeline contradictions found in a single claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyKind {
    /// Report date precedes incident date
    TimelineOrder,
    /// Incident window overlaps another claim by the same claimant
    OverlappingIncident,
    /// Narrative contradicts the structured fields
    NarrativeContradiction,
    /// Claimed amount exceeds the category ceiling by the configured multiple
    AmountExceedsCeiling,
    /// Sales-pressure wording in the narrative
    SuspiciousLanguage,
    /// Repeated whole-dollar amounts in the narrative
    RoundAmounts,
}

impl InconsistencyKind {
    pub const ALL: [InconsistencyKind; 6] = [
        InconsistencyKind::TimelineOrder,
        InconsistencyKind::OverlappingIncident,
        InconsistencyKind::NarrativeContradiction,
        InconsistencyKind::AmountExceedsCeiling,
        InconsistencyKind::SuspiciousLanguage,
        InconsistencyKind::RoundAmounts,
    ];

    /// Signal name used in raw evaluator output
    pub fn as_signal(&self) -> &'static str {
        match self {
            InconsistencyKind::TimelineOrder => "timeline_order",
            InconsistencyKind::OverlappingIncident => "overlapping_incident",
            InconsistencyKind::NarrativeContradiction => "narrative_contradiction",
            InconsistencyKind::AmountExceedsCeiling => "amount_exceeds_ceiling",
            InconsistencyKind::SuspiciousLanguage => "suspicious_language",
            InconsistencyKind::RoundAmounts => "round_amounts",
        }
    }

    pub fn from_signal(signal: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_signal() == signal)
    }
}

/// Photo authenticity heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoCheck {
    AiGenerated,
    Manipulation,
    MetadataTampering,
    LightingInconsistency,
    DuplicateRegions,
    /// Overall authenticity below the authentic threshold
    LowAuthenticity,
}

impl PhotoCheck {
    pub const ALL: [PhotoCheck; 6] = [
        PhotoCheck::AiGenerated,
        PhotoCheck::Manipulation,
        PhotoCheck::MetadataTampering,
        PhotoCheck::LightingInconsistency,
        PhotoCheck::DuplicateRegions,
        PhotoCheck::LowAuthenticity,
    ];

    pub fn as_signal(&self) -> &'static str {
        match self {
            PhotoCheck::AiGenerated => "ai_generated",
            PhotoCheck::Manipulation => "manipulation",
            PhotoCheck::MetadataTampering => "metadata_tampering",
            PhotoCheck::LightingInconsistency => "lighting_inconsistency",
            PhotoCheck::DuplicateRegions => "duplicate_regions",
            PhotoCheck::LowAuthenticity => "low_authenticity",
        }
    }

    pub fn from_signal(signal: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_signal() == signal)
    }
}

/// What kind of signal an indicator is; exhaustive over evaluator categories
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum IndicatorKind {
    Inconsistency { check: InconsistencyKind },
    PatternMatch { case_id: CaseId },
    PhotoAuthenticity { check: PhotoCheck },
}

impl IndicatorKind {
    /// The evaluator category that owns this kind
    pub fn category(&self) -> SignalCategory {
        match self {
            IndicatorKind::Inconsistency { .. } => SignalCategory::Inconsistency,
            IndicatorKind::PatternMatch { .. } => SignalCategory::PatternMatch,
            IndicatorKind::PhotoAuthenticity { .. } => SignalCategory::PhotoAuthenticity,
        }
    }
}

/// Pointer to the source of an indicator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Evidence {
    /// Structured claim fields in conflict
    ClaimFields { fields: Vec<String> },
    /// Byte span of the narrative
    NarrativeSpan { start: usize, end: usize, excerpt: String },
    /// Matched historical fraud case
    HistoricalCase { case_id: CaseId },
    /// Attached photo
    Photo { reference: String },
    /// Other claims involved in the contradiction
    RelatedClaims { claim_ids: Vec<ClaimId> },
    #[default]
    Unspecified,
}

impl Evidence {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Evidence::ClaimFields {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single normalized fraud signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    kind: IndicatorKind,
    confidence: f64,
    severity: Severity,
    evidence: Evidence,
    rationale: String,
}

impl Indicator {
    /// Creates an indicator from already-validated parts
    ///
    /// # Errors
    ///
    /// Returns `SignalError::InvalidConfidence` unless `confidence` is a finite
    /// value in `[0, 1]`, and `SignalError::MissingRationale` for a blank rationale.
    pub fn new(
        kind: IndicatorKind,
        confidence: f64,
        severity: Severity,
        evidence: Evidence,
        rationale: impl Into<String>,
    ) -> Result<Self, SignalError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(SignalError::InvalidConfidence(confidence));
        }
        let rationale = rationale.into();
        if rationale.trim().is_empty() {
            return Err(SignalError::MissingRationale);
        }
        Ok(Self {
            kind,
            confidence,
            severity,
            evidence,
            rationale,
        })
    }

    pub fn kind(&self) -> &IndicatorKind {
        &self.kind
    }

    pub fn category(&self) -> SignalCategory {
        self.kind.category()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    /// Canonical indicator order: severity desc, then confidence desc.
    ///
    /// Remaining ties are broken on kind, rationale and evidence so the order
    /// is total and independent of which evaluator finished first.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        other
            .severity
            .cmp(&self.severity)
            .then_with(|| other.confidence.total_cmp(&self.confidence))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.rationale.cmp(&other.rationale))
            .then_with(|| self.evidence.cmp(&other.evidence))
    }
}

/// Sorts indicators into canonical order
pub fn order_indicators(mut indicators: Vec<Indicator>) -> Vec<Indicator> {
    indicators.sort_by(Indicator::canonical_cmp);
    indicators
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(severity: Severity, confidence: f64, rationale: &str) -> Indicator {
        Indicator::new(
            IndicatorKind::Inconsistency {
                check: InconsistencyKind::TimelineOrder,
            },
            confidence,
            severity,
            Evidence::Unspecified,
            rationale,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let kind = IndicatorKind::PhotoAuthenticity {
            check: PhotoCheck::AiGenerated,
        };
        assert!(Indicator::new(kind.clone(), 1.2, Severity::Low, Evidence::Unspecified, "x").is_err());
        assert!(Indicator::new(kind.clone(), f64::NAN, Severity::Low, Evidence::Unspecified, "x").is_err());
        assert!(Indicator::new(kind, 0.5, Severity::Low, Evidence::Unspecified, "  ").is_err());
    }

    #[test]
    fn test_canonical_order_severity_then_confidence() {
        let ordered = order_indicators(vec![
            indicator(Severity::Medium, 0.9, "a"),
            indicator(Severity::Critical, 0.86, "b"),
            indicator(Severity::Medium, 0.4, "c"),
            indicator(Severity::Critical, 0.99, "d"),
        ]);
        let rationales: Vec<&str> = ordered.iter().map(|i| i.rationale()).collect();
        assert_eq!(rationales, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_signal_names_round_trip() {
        for kind in InconsistencyKind::ALL {
            assert_eq!(InconsistencyKind::from_signal(kind.as_signal()), Some(kind));
        }
        for check in PhotoCheck::ALL {
            assert_eq!(PhotoCheck::from_signal(check.as_signal()), Some(check));
        }
        assert_eq!(InconsistencyKind::from_signal("ai_generated"), None);
    }

    #[test]
    fn test_kind_category() {
        let kind = IndicatorKind::PatternMatch {
            case_id: CaseId::new("CASE-1"),
        };
        assert_eq!(kind.category(), SignalCategory::PatternMatch);
    }
}
