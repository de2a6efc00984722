//! Pre-built Test Fixtures
//!
//! Provides ready-to-use claims, corpora and indicators. These fixtures are
//! designed to be consistent and predictable across the test suite.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::CaseId;
use domain_claims::{ClaimCategory, ClaimRecord};
use domain_signals::{
    Evidence, Indicator, IndicatorKind, InconsistencyKind, PhotoCheck, Severity,
};

use crate::builders::ClaimRecordBuilder;

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// Standard incident date (Mar 4, 2024)
    pub fn incident() -> NaiveDate {
        Self::day(4)
    }

    /// A day in March 2024
    pub fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }
}

/// Shared entities of the ring scenario
pub struct RingScenario {
    pub claims: Vec<ClaimRecord>,
    pub shared_address: &'static str,
    pub shared_provider: &'static str,
    pub claimant_ids: Vec<String>,
}

/// Fixture for graph scenarios
pub struct ScenarioFixtures;

impl ScenarioFixtures {
    /// Five claimants sharing one address and one provider, with incidents
    /// inside a ten-day window
    pub fn ring_of_five() -> RingScenario {
        let shared_address = "88 Harbor View Rd, Apt 4";
        let shared_provider = "PRV-QUICKFIX-AUTO";
        let claimant_ids: Vec<String> = (1..=5).map(|i| format!("PTY-RING-{}", i)).collect();

        let claims = claimant_ids
            .iter()
            .enumerate()
            .map(|(i, claimant)| {
                ClaimRecordBuilder::new()
                    .with_claim_id(format!("CLM-RING-{}", i + 1))
                    .with_claimant(claimant.as_str())
                    .with_provider(shared_provider)
                    // Spelling variants of the same address
                    .with_address(if i % 2 == 0 {
                        shared_address.to_string()
                    } else {
                        shared_address.to_uppercase().replace(',', "")
                    })
                    .with_phone(format!("555-01{:02}-77{:02}", i, i))
                    .with_incident_date(DateFixtures::day(1 + 2 * i as u32))
                    .with_narrative("Rear-end collision at low speed, vehicle towed to QuickFix.")
                    .build()
            })
            .collect();

        RingScenario {
            claims,
            shared_address,
            shared_provider,
            claimant_ids,
        }
    }

    /// `n` claims with no entity in common
    pub fn distinct_corpus(n: usize) -> Vec<ClaimRecord> {
        (0..n)
            .map(|i| {
                ClaimRecordBuilder::new()
                    .with_claim_id(format!("CLM-D-{}", i))
                    .with_claimant(format!("PTY-D-{}", i))
                    .with_provider(format!("PRV-D-{}", i))
                    .with_address(format!("{} Distinct St", i + 1))
                    .with_phone(format!("555{:07}", i))
                    .with_bank_account(format!("ACCT-{:08}", i))
                    .with_incident_date(DateFixtures::day(1 + (i % 28) as u32))
                    .build()
            })
            .collect()
    }

    /// A claim reported before the incident happened
    pub fn backdated_claim() -> ClaimRecord {
        ClaimRecordBuilder::new()
            .with_incident_date(DateFixtures::day(10))
            .with_report_date(DateFixtures::day(8))
            .build()
    }

    /// A claim whose narrative hits the staged accident and inflated damages patterns
    pub fn staged_accident_claim() -> ClaimRecord {
        ClaimRecordBuilder::new()
            .with_category(ClaimCategory::AutoCollision)
            .with_amount(dec!(18500.00))
            .with_narrative(
                "The driver ahead made a sudden stop that looked intentional and pre-planned. \
                 The repair quote is excessive and overpriced for the market value of the car.",
            )
            .build()
    }
}

/// Fixture for indicators
pub struct IndicatorFixtures;

impl IndicatorFixtures {
    pub fn inconsistency(severity: Severity, confidence: f64) -> Indicator {
        Indicator::new(
            IndicatorKind::Inconsistency {
                check: InconsistencyKind::TimelineOrder,
            },
            confidence,
            severity,
            Evidence::fields(["report_date", "incident_date"]),
            "report_date precedes incident_date",
        )
        .unwrap()
    }

    pub fn pattern(case_id: &str, severity: Severity, confidence: f64) -> Indicator {
        Indicator::new(
            IndicatorKind::PatternMatch {
                case_id: CaseId::new(case_id),
            },
            confidence,
            severity,
            Evidence::HistoricalCase {
                case_id: CaseId::new(case_id),
            },
            "matches historical case",
        )
        .unwrap()
    }

    pub fn photo(severity: Severity, confidence: f64) -> Indicator {
        Indicator::new(
            IndicatorKind::PhotoAuthenticity {
                check: PhotoCheck::Manipulation,
            },
            confidence,
            severity,
            Evidence::Photo {
                reference: "front.jpg".to_string(),
            },
            "pixel-level manipulation",
        )
        .unwrap()
    }

    /// The single high-confidence critical indicator
    pub fn critical() -> Indicator {
        Self::inconsistency(Severity::Critical, 0.95)
    }
}
