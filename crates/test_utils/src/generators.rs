//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{CaseId, ClaimId, ClaimantId, ProviderId};
use domain_claims::{ClaimCategory, ClaimRecord};
use domain_signals::{
    Evidence, Indicator, IndicatorKind, InconsistencyKind, PhotoCheck, Severity,
};

/// Strategy for generating confidences in `[0, 1]`
pub fn confidence_strategy() -> impl Strategy<Value = f64> {
    (0u32..=1000u32).prop_map(|n| n as f64 / 1000.0)
}

/// Strategy for generating severities
pub fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Low),
        Just(Severity::Medium),
        Just(Severity::High),
        Just(Severity::Critical),
    ]
}

/// Strategy for generating claim categories
pub fn claim_category_strategy() -> impl Strategy<Value = ClaimCategory> {
    prop_oneof![
        Just(ClaimCategory::AutoCollision),
        Just(ClaimCategory::AutoTheft),
        Just(ClaimCategory::PropertyDamage),
        Just(ClaimCategory::Medical),
        Just(ClaimCategory::Other),
    ]
}

/// Strategy for generating indicator kinds across all three categories
pub fn indicator_kind_strategy() -> impl Strategy<Value = IndicatorKind> {
    prop_oneof![
        (0usize..InconsistencyKind::ALL.len()).prop_map(|i| IndicatorKind::Inconsistency {
            check: InconsistencyKind::ALL[i],
        }),
        (1u32..50u32).prop_map(|n| IndicatorKind::PatternMatch {
            case_id: CaseId::new(format!("FP-{}", n)),
        }),
        prop_oneof![
            Just(PhotoCheck::AiGenerated),
            Just(PhotoCheck::Manipulation),
            Just(PhotoCheck::MetadataTampering),
            Just(PhotoCheck::LowAuthenticity),
        ]
        .prop_map(|check| IndicatorKind::PhotoAuthenticity { check }),
    ]
}

/// Strategy for generating valid indicators
pub fn indicator_strategy() -> impl Strategy<Value = Indicator> {
    (
        indicator_kind_strategy(),
        confidence_strategy(),
        severity_strategy(),
        "[a-z]{3,12}( [a-z]{2,8}){0,3}",
    )
        .prop_map(|(kind, confidence, severity, rationale)| {
            Indicator::new(kind, confidence, severity, Evidence::Unspecified, rationale)
                .expect("Generated invalid indicator")
        })
}

/// Strategy for generating indicator sets of up to `max` elements
pub fn indicators_strategy(max: usize) -> impl Strategy<Value = Vec<Indicator>> {
    proptest::collection::vec(indicator_strategy(), 0..=max)
}

/// Strategy for generating incident dates in 2024
pub fn incident_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..365i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date") + Duration::days(days)
    })
}

/// Strategy for generating claim records
///
/// Claimant, provider and address are drawn from small pools so that
/// generated corpora share entities.
pub fn claim_record_strategy() -> impl Strategy<Value = ClaimRecord> {
    (
        1u32..10_000u32,
        0u32..6u32,
        0u32..4u32,
        proptest::option::of(0u32..4u32),
        claim_category_strategy(),
        incident_date_strategy(),
        0i64..10i64,
        100i64..5_000_000i64,
    )
        .prop_map(
            |(claim, claimant, provider, address, category, incident, lag, cents)| ClaimRecord {
                claim_id: ClaimId::new(format!("CLM-P-{}", claim)),
                claimant_id: ClaimantId::new(format!("PTY-P-{}", claimant)),
                provider_id: ProviderId::new(format!("PRV-P-{}", provider)),
                claimant_name: None,
                provider_name: None,
                address: address.map(|a| format!("{} Pool Ave", a + 1)),
                phone: None,
                bank_account: None,
                category,
                incident_date: incident,
                incident_end_date: None,
                report_date: incident + Duration::days(lag),
                claimed_amount: Decimal::new(cents, 2),
                location: None,
                narrative: "Generated claim".to_string(),
                attachments: Vec::new(),
            },
        )
}

/// Strategy for generating corpora of claims with unique claim ids
pub fn claim_corpus_strategy(max: usize) -> impl Strategy<Value = Vec<ClaimRecord>> {
    proptest::collection::vec(claim_record_strategy(), 1..=max).prop_map(|claims| {
        claims
            .into_iter()
            .enumerate()
            .map(|(i, mut claim)| {
                claim.claim_id = ClaimId::new(format!("CLM-P-{}", i));
                claim
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn confidence_is_in_unit_interval(c in confidence_strategy()) {
            prop_assert!((0.0..=1.0).contains(&c));
        }

        #[test]
        fn generated_claims_report_after_incident(claim in claim_record_strategy()) {
            prop_assert!(claim.report_date >= claim.incident_date);
            prop_assert!(claim.claimed_amount > Decimal::ZERO);
        }

        #[test]
        fn corpus_claim_ids_are_unique(corpus in claim_corpus_strategy(12)) {
            let ids: std::collections::BTreeSet<_> = corpus.iter().map(|c| c.claim_id.clone()).collect();
            prop_assert_eq!(ids.len(), corpus.len());
        }
    }
}
