//! Claim assessment result

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, RunId};
use domain_network::NetworkAssessment;
use domain_signals::{
    Indicator, PartialSignalLoss, Recommendation, RiskLevel, ScoreBreakdown, SignalCategory,
    SoftSignalFailure,
};

use crate::error::HardRunFailure;
use crate::state::{RunState, StateTrail};

/// Part of the evidence that did not contribute to an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "source", content = "category", rename_all = "snake_case")]
pub enum CoverageSource {
    Signal(SignalCategory),
    Network,
}

impl fmt::Display for CoverageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageSource::Signal(category) => write!(f, "{} signals", category),
            CoverageSource::Network => f.write_str("network analysis"),
        }
    }
}

/// An evidence source that was unavailable, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub source: CoverageSource,
    pub reason: String,
}

impl CoverageGap {
    pub fn new(source: CoverageSource, reason: impl Into<String>) -> Self {
        Self {
            source,
            reason: reason.into(),
        }
    }

    pub fn signal(failure: &SoftSignalFailure) -> Self {
        Self::new(CoverageSource::Signal(failure.category), failure.reason.clone())
    }
}

/// Outcome of one assessment run
///
/// Built once when the run terminates and never modified afterwards. A
/// failed run still yields an assessment: its risk level is `Indeterminate`,
/// its recommendation is `Review` and `failure` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAssessment {
    pub claim_id: ClaimId,
    pub run_id: RunId,
    /// Fraud score in `[0, 100]`
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
    /// Indicators in canonical order
    pub indicators: Vec<Indicator>,
    pub recommendation: Recommendation,
    pub network: Option<NetworkAssessment>,
    /// `Complete` or `Failed`
    pub state: RunState,
    pub state_trail: StateTrail,
    pub breakdown: ScoreBreakdown,
    pub coverage_gaps: Vec<CoverageGap>,
    pub signal_failures: Vec<SoftSignalFailure>,
    pub signal_losses: Vec<PartialSignalLoss>,
    pub failure: Option<HardRunFailure>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ClaimAssessment {
    /// True when any signal category or the network analysis was unavailable
    pub fn is_degraded(&self) -> bool {
        !self.coverage_gaps.is_empty()
    }

    pub fn is_failed(&self) -> bool {
        self.state == RunState::Failed
    }

    pub fn has_gap(&self, source: CoverageSource) -> bool {
        self.coverage_gaps.iter().any(|gap| gap.source == source)
    }

    pub fn ring_detected(&self) -> bool {
        self.network.as_ref().map(|n| n.ring_detected).unwrap_or(false)
    }

    /// Processing time in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(gaps: Vec<CoverageGap>) -> ClaimAssessment {
        let now = Utc::now();
        ClaimAssessment {
            claim_id: ClaimId::new("CLM-1"),
            run_id: RunId::new_v7(),
            fraud_score: 0.0,
            risk_level: RiskLevel::Low,
            indicators: Vec::new(),
            recommendation: Recommendation::Approve,
            network: None,
            state: RunState::Complete,
            state_trail: StateTrail::new(),
            breakdown: ScoreBreakdown::default(),
            coverage_gaps: gaps,
            signal_failures: Vec::new(),
            signal_losses: Vec::new(),
            failure: None,
            started_at: now,
            completed_at: now,
        }
    }

    #[test]
    fn test_gap_marks_assessment_degraded() {
        assert!(!assessment(Vec::new()).is_degraded());

        let failure = SoftSignalFailure::timeout(SignalCategory::PatternMatch, 5000);
        let degraded = assessment(vec![CoverageGap::signal(&failure)]);
        assert!(degraded.is_degraded());
        assert!(degraded.has_gap(CoverageSource::Signal(SignalCategory::PatternMatch)));
        assert!(!degraded.has_gap(CoverageSource::Network));
    }

    #[test]
    fn test_coverage_source_serialization() {
        let json = serde_json::to_value(CoverageSource::Signal(SignalCategory::PhotoAuthenticity)).unwrap();
        assert_eq!(json["source"], "signal");
        assert_eq!(json["category"], "photo_authenticity");
        assert_eq!(CoverageSource::Network.to_string(), "network analysis");
    }
}
