//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for assessment types that give
//! more meaningful error messages than standard assertions.

use domain_network::{EntityKey, NetworkAssessment};
use domain_signals::{Indicator, RiskLevel, ScoreOutcome};

/// Asserts that indicators are in canonical order: severity descending,
/// then confidence descending, then by kind
pub fn assert_indicators_canonical(indicators: &[Indicator]) {
    for pair in indicators.windows(2) {
        assert!(
            pair[0].canonical_cmp(&pair[1]).is_le(),
            "Indicators out of canonical order: {:?} ({}, {}) before {:?} ({}, {})",
            pair[0].kind(),
            pair[0].severity() as u8,
            pair[0].confidence(),
            pair[1].kind(),
            pair[1].severity() as u8,
            pair[1].confidence()
        );
    }
}

/// Asserts that a fraud score lies in `[0, 100]` and has at most two decimals
pub fn assert_score_in_range(score: f64) {
    assert!(
        (0.0..=100.0).contains(&score),
        "Fraud score {} outside [0, 100]",
        score
    );
    let scaled = score * 100.0;
    assert!(
        (scaled - scaled.round()).abs() < 1e-6,
        "Fraud score {} has more than two decimals",
        score
    );
}

/// Asserts the risk level of a scoring outcome
pub fn assert_risk_level(outcome: &ScoreOutcome, expected: RiskLevel) {
    assert_eq!(
        outcome.risk_level, expected,
        "Expected risk level {} for score {}, got {}",
        expected, outcome.fraud_score, outcome.risk_level
    );
}

/// Asserts that a network assessment reports no ring
pub fn assert_no_ring(assessment: &NetworkAssessment) {
    assert!(
        !assessment.ring_detected,
        "Expected no ring, got score {} with members {:?}",
        assessment.network_score,
        assessment.ring_members
    );
    assert_eq!(assessment.ring_size, 0, "Ring size must be zero without a ring");
}

/// Asserts that a ring was detected and contains every expected entity
pub fn assert_ring_contains<'a>(
    assessment: &NetworkAssessment,
    expected: impl IntoIterator<Item = &'a EntityKey>,
) {
    assert!(
        assessment.ring_detected,
        "Expected a ring, network score was {}",
        assessment.network_score
    );
    for key in expected {
        assert!(
            assessment.ring_members.contains(key),
            "Ring members {:?} do not include {}",
            assessment.ring_members,
            key
        );
    }
}
