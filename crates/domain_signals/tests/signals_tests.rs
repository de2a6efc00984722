//! Tests for domain_signals

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal_macros::dec;
use serde_json::json;

use core_kernel::CaseId;
use domain_signals::config::{InconsistencyConfig, PatternConfig, PhotoConfig, ScoringConfig};
use domain_signals::evaluator::{EvaluationContext, SignalEvaluator};
use domain_signals::indicator::{IndicatorKind, InconsistencyKind, PhotoCheck, Severity, SignalCategory};
use domain_signals::normalizer::{RawFinding, SignalNormalizer};
use domain_signals::ports::HistoricalMatch;
use domain_signals::scoring::{Recommendation, RiskLevel, RiskScoringEngine};
use domain_signals::{
    InconsistencyEvaluator, KeywordPatternIndex, PatternEvaluator, PhotoAuthenticityEvaluator,
    PhotoUpload,
};
use test_utils::{
    assert_indicators_canonical, assert_score_in_range, indicators_strategy, ClaimRecordBuilder,
    DateFixtures, EmptyClaimHistory, FailingPatternIndex, FailureMode, InMemoryClaimHistory,
    IndicatorFixtures, ScenarioFixtures, StaticPatternIndex, StubPhotoAnalyzer,
};

fn engine() -> RiskScoringEngine {
    RiskScoringEngine::new(ScoringConfig::default()).unwrap()
}

fn inconsistency_evaluator() -> InconsistencyEvaluator {
    InconsistencyEvaluator::new(InconsistencyConfig::default(), Arc::new(EmptyClaimHistory))
}

// ============================================================================
// Normalizer Tests
// ============================================================================

mod normalizer_tests {
    use super::*;

    #[test]
    fn test_unknown_signal_becomes_partial_loss() {
        let out = SignalNormalizer::default().normalize(
            vec![
                RawFinding::new("timeline_order", 0.95, "report precedes incident"),
                RawFinding::new("moon_phase", 0.8, "full moon on incident date"),
            ],
            SignalCategory::Inconsistency,
        );
        assert_eq!(out.indicators.len(), 1);
        assert_eq!(out.losses.len(), 1);
        assert_eq!(out.losses[0].index, 1);
        assert!(out.losses[0].reason.contains("moon_phase"));
    }

    #[test]
    fn test_nan_confidence_and_blank_rationale_dropped() {
        let out = SignalNormalizer::default().normalize(
            vec![
                RawFinding::new("manipulation", f64::NAN, "pixel-level manipulation"),
                RawFinding::new("ai_generated", 0.9, "   "),
            ],
            SignalCategory::PhotoAuthenticity,
        );
        assert!(out.indicators.is_empty());
        assert_eq!(out.losses.len(), 2);
    }

    #[test]
    fn test_out_of_range_confidence_is_clamped_and_recorded() {
        let out = SignalNormalizer::default().normalize(
            vec![RawFinding::new("ai_generated", 1.4, "synthetic texture")],
            SignalCategory::PhotoAuthenticity,
        );
        assert_eq!(out.indicators.len(), 1);
        assert_eq!(out.indicators[0].confidence(), 1.0);
        assert_eq!(out.indicators[0].severity(), Severity::Critical);
        assert_eq!(out.corrections.len(), 1);
        assert_eq!(out.corrections[0].original, 1.4);
    }

    #[test]
    fn test_pattern_match_requires_case_id() {
        let out = SignalNormalizer::default().normalize(
            vec![
                RawFinding::new("pattern_match", 0.8, "similar to staged accident"),
                RawFinding::new("pattern_match", 0.8, "similar to staged accident")
                    .with_case(CaseId::new("FP-STAGED-ACCIDENT")),
            ],
            SignalCategory::PatternMatch,
        );
        assert_eq!(out.indicators.len(), 1);
        assert_eq!(out.losses[0].index, 0);
        assert_eq!(
            out.indicators[0].kind(),
            &IndicatorKind::PatternMatch {
                case_id: CaseId::new("FP-STAGED-ACCIDENT")
            }
        );
    }

    #[test]
    fn test_json_losses_report_original_positions() {
        let out = SignalNormalizer::default().normalize_json(
            vec![
                json!({"confidence": 0.9}),
                json!({"signal": "timeline_order", "confidence": 0.95, "rationale": "backdated"}),
                json!({"signal": "made_up", "confidence": 0.5, "rationale": "?"}),
            ],
            SignalCategory::Inconsistency,
        );
        assert_eq!(out.indicators.len(), 1);
        let indexes: Vec<usize> = out.losses.iter().map(|l| l.index).collect();
        assert_eq!(indexes, vec![0, 2]);
    }
}

// ============================================================================
// Scoring Tests
// ============================================================================

mod scoring_tests {
    use super::*;

    #[test]
    fn test_empty_set_scores_zero() {
        let outcome = engine().score(&[]);
        assert_eq!(outcome.fraud_score, 0.0);
        assert_eq!(outcome.risk_level, RiskLevel::Low);
        assert_eq!(outcome.recommendation, Recommendation::Approve);
    }

    #[test]
    fn test_critical_indicator_forces_investigation() {
        let outcome = engine().score(&[IndicatorFixtures::critical()]);
        assert_eq!(outcome.fraud_score, 37.81);
        assert_eq!(outcome.risk_level, RiskLevel::Medium);
        assert_eq!(outcome.recommendation, Recommendation::Investigate);
        assert!(outcome.override_applied);
    }

    #[test]
    fn test_low_confidence_critical_does_not_override() {
        let outcome = engine().score(&[IndicatorFixtures::inconsistency(Severity::Critical, 0.5)]);
        assert!(!outcome.override_applied);
    }

    #[test]
    fn test_breakdown_counts_severities() {
        let outcome = engine().score(&[
            IndicatorFixtures::inconsistency(Severity::High, 0.7),
            IndicatorFixtures::pattern("FP-1", Severity::High, 0.65),
            IndicatorFixtures::photo(Severity::Low, 0.2),
        ]);
        assert_eq!(outcome.breakdown.count(Severity::High), 2);
        assert_eq!(outcome.breakdown.count(Severity::Low), 1);
        assert_eq!(outcome.breakdown.count(Severity::Critical), 0);
        assert_eq!(outcome.breakdown.categories.len(), 3);
    }

    #[test]
    fn test_category_cap_limits_one_category() {
        let many: Vec<_> = (0..30)
            .map(|i| IndicatorFixtures::pattern(&format!("FP-{}", i), Severity::Critical, 1.0))
            .collect();
        let outcome = engine().score(&many);
        let pattern = outcome
            .breakdown
            .categories
            .iter()
            .find(|c| c.category == SignalCategory::PatternMatch)
            .unwrap();
        assert_eq!(pattern.capped, ScoringConfig::default().category_cap);
        assert!(outcome.fraud_score < 60.0);
    }

    proptest! {
        #[test]
        fn score_is_deterministic(indicators in indicators_strategy(12)) {
            let e = engine();
            prop_assert_eq!(e.score(&indicators), e.score(&indicators));
        }

        #[test]
        fn score_ignores_input_order(indicators in indicators_strategy(12)) {
            let e = engine();
            let mut reversed = indicators.clone();
            reversed.reverse();
            prop_assert_eq!(e.score(&indicators).fraud_score, e.score(&reversed).fraud_score);
        }

        #[test]
        fn score_is_bounded(indicators in indicators_strategy(40)) {
            assert_score_in_range(engine().score(&indicators).fraud_score);
        }

        #[test]
        fn adding_an_indicator_never_lowers_the_score(
            indicators in indicators_strategy(10),
            severity in test_utils::severity_strategy(),
            confidence in 0.01f64..=1.0,
        ) {
            let extra = IndicatorFixtures::photo(severity, confidence);
            let e = engine();
            let before = e.score(&indicators).fraud_score;
            let mut more = indicators.clone();
            more.push(extra);
            prop_assert!(e.score(&more).fraud_score >= before);
        }

        #[test]
        fn risk_levels_partition_the_score_range(score in 0.0f64..=100.0) {
            let level = engine().risk_level(score);
            let expected = if score >= 80.0 {
                RiskLevel::Critical
            } else if score >= 55.0 {
                RiskLevel::High
            } else if score >= 25.0 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            };
            prop_assert_eq!(level, expected);
        }

        #[test]
        fn ordering_is_canonical(indicators in indicators_strategy(15)) {
            let ordered = domain_signals::order_indicators(indicators);
            assert_indicators_canonical(&ordered);
        }
    }
}

// ============================================================================
// Inconsistency Evaluator Tests
// ============================================================================

mod inconsistency_tests {
    use super::*;

    fn signals(findings: &[RawFinding]) -> Vec<&str> {
        findings.iter().map(|f| f.signal.as_str()).collect()
    }

    #[test]
    fn test_clean_claim_has_no_findings() {
        let claim = ClaimRecordBuilder::new().build();
        assert!(inconsistency_evaluator().check_record(&claim).is_empty());
    }

    #[test]
    fn test_backdated_claim_flags_timeline() {
        let findings = inconsistency_evaluator().check_record(&ScenarioFixtures::backdated_claim());
        assert_eq!(signals(&findings), vec![InconsistencyKind::TimelineOrder.as_signal()]);
        assert_eq!(findings[0].confidence, 0.95);
    }

    #[test]
    fn test_amount_above_ceiling_multiple() {
        let claim = ClaimRecordBuilder::new().with_amount(dec!(150000)).build();
        let findings = inconsistency_evaluator().check_record(&claim);
        assert_eq!(signals(&findings), vec!["amount_exceeds_ceiling"]);
        // 2x the limit
        assert!((findings[0].confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_narrative_total_mismatch() {
        let claim = ClaimRecordBuilder::new()
            .with_amount(dec!(2500.00))
            .with_narrative("Body shop estimate came to a total of $4,100 for the bumper.")
            .build();
        let findings = inconsistency_evaluator().check_record(&claim);
        assert_eq!(signals(&findings), vec!["narrative_contradiction"]);
    }

    #[test]
    fn test_narrative_total_within_tolerance() {
        let claim = ClaimRecordBuilder::new()
            .with_amount(dec!(2500.00))
            .with_narrative("The total was $2,510 including tax.")
            .build();
        assert!(inconsistency_evaluator().check_record(&claim).is_empty());
    }

    #[test]
    fn test_narrative_mentions_future_date() {
        let claim = ClaimRecordBuilder::new()
            .with_incident_date(DateFixtures::day(4))
            .with_narrative("Went back to the shop on 2024-03-20 to pick up the car.")
            .build();
        let findings = inconsistency_evaluator().check_record(&claim);
        assert_eq!(signals(&findings), vec!["narrative_contradiction"]);
    }

    #[tokio::test]
    async fn test_overlapping_claims_from_history() {
        let claim = ClaimRecordBuilder::new()
            .with_claimant("PTY-OVERLAP")
            .with_incident_date(DateFixtures::day(10))
            .build();
        let earlier = ClaimRecordBuilder::new()
            .with_claimant("PTY-OVERLAP")
            .with_incident_date(DateFixtures::day(8))
            .with_incident_end_date(DateFixtures::day(12))
            .build();
        let history = InMemoryClaimHistory::new(vec![claim.clone(), earlier.clone()]);
        let evaluator = InconsistencyEvaluator::new(InconsistencyConfig::default(), Arc::new(history));

        let findings = evaluator.evaluate(&EvaluationContext::new(claim)).await.unwrap();
        assert_eq!(signals(&findings), vec!["overlapping_incident"]);
        assert!(findings[0].rationale.contains(earlier.claim_id.as_str()));
    }
}

// ============================================================================
// Pattern Evaluator Tests
// ============================================================================

mod pattern_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_cases_collapse_to_best_similarity() {
        let index = StaticPatternIndex::new(vec![
            HistoricalMatch::new("FP-7", 0.65, "staged accident"),
            HistoricalMatch::new("FP-7", 0.82, "staged accident"),
            HistoricalMatch::new("FP-9", 0.4, "below threshold"),
        ]);
        let evaluator = PatternEvaluator::new(PatternConfig::default(), Arc::new(index));
        let ctx = EvaluationContext::new(ClaimRecordBuilder::new().build());

        let findings = evaluator.evaluate(&ctx).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].confidence, 0.82);
        assert_eq!(findings[0].case_id, Some(CaseId::new("FP-7")));
    }

    #[tokio::test]
    async fn test_unavailable_index_is_soft() {
        let evaluator = PatternEvaluator::new(
            PatternConfig::default(),
            Arc::new(FailingPatternIndex::new(FailureMode::Unavailable)),
        );
        let err = evaluator
            .evaluate(&EvaluationContext::new(ClaimRecordBuilder::new().build()))
            .await
            .unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(err.category(), SignalCategory::PatternMatch);
    }

    #[tokio::test]
    async fn test_malformed_response_is_fatal() {
        let evaluator = PatternEvaluator::new(
            PatternConfig::default(),
            Arc::new(FailingPatternIndex::new(FailureMode::ContractViolation)),
        );
        let err = evaluator
            .evaluate(&EvaluationContext::new(ClaimRecordBuilder::new().build()))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_keyword_index_finds_staged_accident() {
        let evaluator = PatternEvaluator::new(
            PatternConfig::default(),
            Arc::new(KeywordPatternIndex::with_default_catalog()),
        );
        let ctx = EvaluationContext::new(ScenarioFixtures::staged_accident_claim());
        let findings = evaluator.evaluate(&ctx).await.unwrap();

        let cases: Vec<_> = findings.iter().filter_map(|f| f.case_id.clone()).collect();
        assert!(cases.contains(&CaseId::new("FP-STAGED-ACCIDENT")));
        assert!(cases.contains(&CaseId::new("FP-INFLATED-DAMAGES")));
    }

    #[test]
    fn test_keyword_index_ignores_single_hits() {
        let index = KeywordPatternIndex::with_default_catalog();
        assert!(index.search("the repair was excessive", 5).is_empty());
    }
}

// ============================================================================
// Photo Authenticity Tests
// ============================================================================

mod photo_tests {
    use super::*;

    #[tokio::test]
    async fn test_clean_photos_have_no_findings() {
        let analyzer = StubPhotoAnalyzer::clean();
        let evaluator = PhotoAuthenticityEvaluator::new(PhotoConfig::default(), Arc::new(analyzer.clone()));
        let ctx = EvaluationContext::new(ClaimRecordBuilder::new().build())
            .with_photos(vec![PhotoUpload::new("front.jpg", vec![0u8; 16])]);

        assert!(evaluator.evaluate(&ctx).await.unwrap().is_empty());
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn test_synthetic_photo_is_flagged_and_normalized() {
        let analyzer = StubPhotoAnalyzer::clean().with_report("front.jpg", StubPhotoAnalyzer::synthetic_report());
        let evaluator = PhotoAuthenticityEvaluator::new(PhotoConfig::default(), Arc::new(analyzer));
        let ctx = EvaluationContext::new(ClaimRecordBuilder::new().build()).with_photos(vec![
            PhotoUpload::new("front.jpg", vec![1u8; 16]),
            PhotoUpload::new("rear.jpg", vec![2u8; 16]),
        ]);

        let findings = evaluator.evaluate(&ctx).await.unwrap();
        let out = SignalNormalizer::default().normalize(findings, SignalCategory::PhotoAuthenticity);

        assert!(out.losses.is_empty());
        let checks: Vec<_> = out
            .indicators
            .iter()
            .map(|i| match i.kind() {
                IndicatorKind::PhotoAuthenticity { check } => *check,
                other => panic!("unexpected kind {:?}", other),
            })
            .collect();
        assert!(checks.contains(&PhotoCheck::AiGenerated));
        assert!(checks.contains(&PhotoCheck::LowAuthenticity));
        assert!(!checks.contains(&PhotoCheck::DuplicateRegions));
    }

    #[tokio::test]
    async fn test_analyzer_outage_is_soft() {
        let evaluator = PhotoAuthenticityEvaluator::new(
            PhotoConfig::default(),
            Arc::new(StubPhotoAnalyzer::failing(FailureMode::Timeout)),
        );
        let ctx = EvaluationContext::new(ClaimRecordBuilder::new().build())
            .with_photos(vec![PhotoUpload::new("front.jpg", vec![0u8; 4])]);
        let err = evaluator.evaluate(&ctx).await.unwrap_err();
        assert!(!err.is_fatal());
    }
}
