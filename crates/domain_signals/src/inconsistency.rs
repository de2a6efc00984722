//! Inconsistency Evaluator
//!
//! Detects contradictions inside a single claim and against the claimant's
//! other claims:
//!
//! - report date preceding the incident date
//! - incident windows overlapping another claim by the same claimant
//! - narrative contradicting the structured fields (stated total, dates after
//!   the report date)
//! - claimed amount above the category ceiling times the configured multiple
//! - sales-pressure wording and repeated whole-dollar amounts in the narrative
//!
//! Every finding cites the conflicting fields in its rationale and evidence.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use domain_claims::ClaimRecord;

use crate::config::InconsistencyConfig;
use crate::error::EvaluatorError;
use crate::evaluator::{EvaluationContext, SignalEvaluator};
use crate::indicator::{Evidence, InconsistencyKind, SignalCategory};
use crate::normalizer::RawFinding;
use crate::ports::ClaimHistory;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("static regex"));

static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("static regex"));

static STATED_TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\btotal\b[^$\n]{0,40}\$\s?([0-9][0-9,]*(?:\.[0-9]{1,2})?)")
        .expect("static regex")
});

static ROUND_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s?[0-9][0-9,]*\.00\b").expect("static regex"));

fn parse_amount(text: &str) -> Option<Decimal> {
    Decimal::from_str(&text.replace(',', "")).ok()
}

/// Evaluator for logical and timeline contradictions
pub struct InconsistencyEvaluator {
    config: InconsistencyConfig,
    history: Arc<dyn ClaimHistory>,
}

impl InconsistencyEvaluator {
    pub fn new(config: InconsistencyConfig, history: Arc<dyn ClaimHistory>) -> Self {
        Self { config, history }
    }

    /// Runs every check that needs nothing but the claim itself
    pub fn check_record(&self, claim: &ClaimRecord) -> Vec<RawFinding> {
        let mut findings = Vec::new();
        findings.extend(self.check_timeline(claim));
        findings.extend(self.check_amount_ceiling(claim));
        findings.extend(self.check_narrative_total(claim));
        findings.extend(self.check_narrative_dates(claim));
        findings.extend(self.check_suspicious_language(claim));
        findings.extend(self.check_round_amounts(claim));
        findings
    }

    /// Flags claims from the claimant's history whose incident windows overlap.
    ///
    /// `history` is taken as resolved by the `ClaimHistory` adapter, so
    /// variant spellings of the claimant reference are not filtered out here.
    pub fn check_overlaps(&self, claim: &ClaimRecord, history: &[ClaimRecord]) -> Option<RawFinding> {
        let overlapping: BTreeSet<_> = history
            .iter()
            .filter(|other| other.claim_id != claim.claim_id)
            .filter(|other| claim.incident_overlaps(other))
            .map(|other| other.claim_id.clone())
            .collect();

        if overlapping.is_empty() {
            return None;
        }

        let (start, end) = claim.incident_window();
        let listed: Vec<String> = overlapping.iter().map(ToString::to_string).collect();
        Some(
            RawFinding::new(
                InconsistencyKind::OverlappingIncident.as_signal(),
                self.config.overlap_confidence,
                format!(
                    "incident window {}..{} overlaps claims {} filed by the same claimant",
                    start,
                    end,
                    listed.join(", ")
                ),
            )
            .with_evidence(Evidence::RelatedClaims {
                claim_ids: overlapping.into_iter().collect(),
            }),
        )
    }

    fn check_timeline(&self, claim: &ClaimRecord) -> Option<RawFinding> {
        if claim.report_date >= claim.incident_date {
            return None;
        }
        Some(
            RawFinding::new(
                InconsistencyKind::TimelineOrder.as_signal(),
                self.config.timeline_confidence,
                format!(
                    "report_date {} precedes incident_date {}",
                    claim.report_date, claim.incident_date
                ),
            )
            .with_evidence(Evidence::fields(["report_date", "incident_date"])),
        )
    }

    fn check_amount_ceiling(&self, claim: &ClaimRecord) -> Option<RawFinding> {
        let ceiling = self.config.ceiling_for(claim.category)?;
        let limit = ceiling * self.config.ceiling_multiple;
        if limit <= Decimal::ZERO || claim.claimed_amount <= limit {
            return None;
        }

        let ratio = (claim.claimed_amount / limit).to_f64().unwrap_or(1.0);
        let confidence = (0.55 + 0.2 * (ratio - 1.0)).min(0.95);
        Some(
            RawFinding::new(
                InconsistencyKind::AmountExceedsCeiling.as_signal(),
                confidence,
                format!(
                    "claimed_amount {} exceeds {}x the {} ceiling of {}",
                    claim.claimed_amount,
                    self.config.ceiling_multiple,
                    claim.category.as_str(),
                    ceiling
                ),
            )
            .with_evidence(Evidence::fields(["claimed_amount", "category"])),
        )
    }

    fn check_narrative_total(&self, claim: &ClaimRecord) -> Option<RawFinding> {
        let captures = STATED_TOTAL.captures(&claim.narrative)?;
        let whole = captures.get(0)?;
        let stated = parse_amount(captures.get(1)?.as_str())?;

        let difference = (stated - claim.claimed_amount).abs();
        let allowed = claim.claimed_amount.abs() * self.config.total_tolerance;
        if difference <= allowed {
            return None;
        }

        Some(
            RawFinding::new(
                InconsistencyKind::NarrativeContradiction.as_signal(),
                self.config.narrative_total_confidence,
                format!(
                    "narrative states a total of {} but claimed_amount is {}",
                    stated, claim.claimed_amount
                ),
            )
            .with_evidence(Evidence::NarrativeSpan {
                start: whole.start(),
                end: whole.end(),
                excerpt: whole.as_str().to_string(),
            }),
        )
    }

    fn check_narrative_dates(&self, claim: &ClaimRecord) -> Vec<RawFinding> {
        let iso = ISO_DATE.captures_iter(&claim.narrative).filter_map(|c| {
            let whole = c.get(0)?;
            let date = NaiveDate::from_ymd_opt(
                c[1].parse().ok()?,
                c[2].parse().ok()?,
                c[3].parse().ok()?,
            )?;
            Some((whole, date))
        });
        let us = US_DATE.captures_iter(&claim.narrative).filter_map(|c| {
            let whole = c.get(0)?;
            let date = NaiveDate::from_ymd_opt(
                c[3].parse().ok()?,
                c[1].parse().ok()?,
                c[2].parse().ok()?,
            )?;
            Some((whole, date))
        });

        let mut seen = BTreeSet::new();
        let mut mentions: Vec<_> = iso.chain(us).filter(|(_, date)| *date > claim.report_date).collect();
        mentions.sort_by_key(|(m, _)| m.start());

        mentions
            .into_iter()
            .filter(|(_, date)| seen.insert(*date))
            .map(|(m, date)| {
                RawFinding::new(
                    InconsistencyKind::NarrativeContradiction.as_signal(),
                    self.config.narrative_date_confidence,
                    format!(
                        "narrative mentions {} which is after report_date {}",
                        date, claim.report_date
                    ),
                )
                .with_evidence(Evidence::NarrativeSpan {
                    start: m.start(),
                    end: m.end(),
                    excerpt: m.as_str().to_string(),
                })
            })
            .collect()
    }

    fn check_suspicious_language(&self, claim: &ClaimRecord) -> Option<RawFinding> {
        let lowered = claim.narrative.to_ascii_lowercase();
        let mut hits: Vec<(usize, &str)> = self
            .config
            .suspicious_keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .filter_map(|k| lowered.find(&k.to_ascii_lowercase()).map(|pos| (pos, k.as_str())))
            .collect();
        if hits.is_empty() {
            return None;
        }
        hits.sort();

        let (start, first) = hits[0];
        let end = start + first.len();
        let words: Vec<&str> = hits.iter().map(|(_, k)| *k).collect();
        Some(
            RawFinding::new(
                InconsistencyKind::SuspiciousLanguage.as_signal(),
                self.config.suspicious_language_confidence,
                format!("narrative contains suspicious wording: {}", words.join(", ")),
            )
            .with_evidence(Evidence::NarrativeSpan {
                start,
                end,
                excerpt: claim.narrative.get(start..end).unwrap_or(first).to_string(),
            }),
        )
    }

    fn check_round_amounts(&self, claim: &ClaimRecord) -> Option<RawFinding> {
        let amounts: Vec<_> = ROUND_AMOUNT.find_iter(&claim.narrative).collect();
        if amounts.len() < self.config.round_amount_min {
            return None;
        }
        let first = amounts[0];
        Some(
            RawFinding::new(
                InconsistencyKind::RoundAmounts.as_signal(),
                self.config.round_amount_confidence,
                format!(
                    "narrative lists {} whole-dollar amounts",
                    amounts.len()
                ),
            )
            .with_evidence(Evidence::NarrativeSpan {
                start: first.start(),
                end: first.end(),
                excerpt: first.as_str().to_string(),
            }),
        )
    }
}

#[async_trait]
impl SignalEvaluator for InconsistencyEvaluator {
    fn category(&self) -> SignalCategory {
        SignalCategory::Inconsistency
    }

    async fn evaluate(&self, ctx: &EvaluationContext) -> Result<Vec<RawFinding>, EvaluatorError> {
        let claim = ctx.claim.as_ref();
        let mut findings = self.check_record(claim);

        let others = self
            .history
            .claims_for_claimant(&claim.claimant_id, &ctx.metadata)
            .await
            .map_err(|e| EvaluatorError::from_port(self.category(), e))?;
        findings.extend(self.check_overlaps(claim, &others));

        debug!(
            claim_id = %claim.claim_id,
            findings = findings.len(),
            "Inconsistency checks complete"
        );
        Ok(findings)
    }
}
