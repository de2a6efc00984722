//! Investigator narratives
//!
//! Narratives are produced from a finished assessment and never feed back
//! into scoring. An external generator (usually a language model) sits
//! behind `NarrativeGenerator`; `TemplateNarrative` is the built-in fallback.

use std::collections::BTreeMap;
use std::fmt::Write;

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_signals::{Recommendation, RiskLevel, Severity, SignalCategory};

use crate::assessment::ClaimAssessment;

/// Port for narrative generation
#[async_trait]
pub trait NarrativeGenerator: DomainPort + HealthCheckable {
    /// Writes a human-readable report for a finished assessment
    async fn generate(&self, assessment: &ClaimAssessment) -> Result<String, PortError>;
}

/// Deterministic executive summary built from the assessment alone
#[derive(Debug, Clone, Default)]
pub struct TemplateNarrative;

impl TemplateNarrative {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, assessment: &ClaimAssessment) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Fraud risk summary for claim {}", assessment.claim_id);
        let _ = writeln!(
            out,
            "Risk level: {} (score {:.2}/100). Recommendation: {}.",
            assessment.risk_level, assessment.fraud_score, assessment.recommendation
        );
        if let Some(failure) = &assessment.failure {
            let _ = writeln!(
                out,
                "The assessment did not complete: {}. The score is not a reliable basis for a decision.",
                failure
            );
        }

        let counts: Vec<String> = [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ]
        .into_iter()
        .filter_map(|severity| {
            let n = assessment.breakdown.count(severity);
            (n > 0).then(|| format!("{} {}", n, severity_label(severity)))
        })
        .collect();
        if counts.is_empty() {
            let _ = writeln!(out, "No fraud indicators were raised.");
        } else {
            let _ = writeln!(
                out,
                "{} indicator(s) raised: {}.",
                assessment.indicators.len(),
                counts.join(", ")
            );
        }

        let mut by_category: BTreeMap<SignalCategory, Vec<&str>> = BTreeMap::new();
        for indicator in &assessment.indicators {
            by_category
                .entry(indicator.category())
                .or_default()
                .push(indicator.rationale());
        }
        for (category, rationales) in by_category {
            let _ = writeln!(out, "\n{} findings:", category_title(category));
            for rationale in rationales {
                let _ = writeln!(out, "  - {}", rationale);
            }
        }

        if !assessment.coverage_gaps.is_empty() {
            let _ = writeln!(out, "\nIncomplete evidence:");
            for gap in &assessment.coverage_gaps {
                let _ = writeln!(out, "  - {} unavailable: {}", gap.source, gap.reason);
            }
        }

        if let Some(network) = assessment.network.as_ref().filter(|n| n.ring_detected) {
            let _ = writeln!(
                out,
                "\nPossible fraud ring: {} linked entities across {} claimants and {} claims (network score {:.2}).",
                network.ring_size, network.claimant_count, network.claim_count, network.network_score
            );
        }

        let _ = writeln!(out, "\nNext steps:");
        for step in next_steps(assessment) {
            let _ = writeln!(out, "  - {}", step);
        }

        out
    }
}

impl DomainPort for TemplateNarrative {}

#[async_trait]
impl HealthCheckable for TemplateNarrative {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("template-narrative")
    }
}

#[async_trait]
impl NarrativeGenerator for TemplateNarrative {
    async fn generate(&self, assessment: &ClaimAssessment) -> Result<String, PortError> {
        Ok(self.render(assessment))
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
        Severity::Critical => "critical",
    }
}

fn category_title(category: SignalCategory) -> &'static str {
    match category {
        SignalCategory::Inconsistency => "Inconsistency",
        SignalCategory::PatternMatch => "Historical pattern",
        SignalCategory::PhotoAuthenticity => "Photo authenticity",
    }
}

fn next_steps(assessment: &ClaimAssessment) -> Vec<&'static str> {
    let mut steps = Vec::new();
    if assessment.risk_level == RiskLevel::Indeterminate {
        steps.push("Re-run the assessment once the failing collaborator is restored");
    }
    match assessment.recommendation {
        Recommendation::Approve => steps.push("Proceed with standard claim processing"),
        Recommendation::Review => steps.push("Have an adjuster review the flagged findings"),
        Recommendation::Investigate => {
            steps.push("Refer the claim to the special investigations unit");
            steps.push("Verify the incident timeline with the claimant and provider");
        }
        Recommendation::Deny => {
            steps.push("Refer the claim to the special investigations unit");
            steps.push("Hold payment pending investigation outcome");
        }
    }
    if assessment.is_degraded() {
        steps.push("Treat the score as provisional: some evidence sources were unavailable");
    }
    if assessment.ring_detected() {
        steps.push("Review the linked claims of every ring member");
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{CoverageGap, CoverageSource};
    use crate::state::{RunState, StateTrail};
    use chrono::Utc;
    use core_kernel::{ClaimId, RunId};
    use domain_signals::ScoreBreakdown;

    fn clean() -> ClaimAssessment {
        let now = Utc::now();
        ClaimAssessment {
            claim_id: ClaimId::new("CLM-77"),
            run_id: RunId::new_v7(),
            fraud_score: 0.0,
            risk_level: RiskLevel::Low,
            indicators: Vec::new(),
            recommendation: Recommendation::Approve,
            network: None,
            state: RunState::Complete,
            state_trail: StateTrail::new(),
            breakdown: ScoreBreakdown::default(),
            coverage_gaps: Vec::new(),
            signal_failures: Vec::new(),
            signal_losses: Vec::new(),
            failure: None,
            started_at: now,
            completed_at: now,
        }
    }

    #[test]
    fn test_clean_claim_summary() {
        let text = TemplateNarrative::new().render(&clean());
        assert!(text.contains("CLM-77"));
        assert!(text.contains("Risk level: low"));
        assert!(text.contains("No fraud indicators"));
        assert!(text.contains("standard claim processing"));
        assert!(!text.contains("Incomplete evidence"));
    }

    #[test]
    fn test_coverage_gaps_are_stated() {
        let mut assessment = clean();
        assessment.coverage_gaps.push(CoverageGap::new(
            CoverageSource::Signal(SignalCategory::PatternMatch),
            "evaluator timed out after 5000ms",
        ));
        let text = TemplateNarrative::new().render(&assessment);
        assert!(text.contains("pattern_match signals unavailable"));
        assert!(text.contains("provisional"));
    }
}
