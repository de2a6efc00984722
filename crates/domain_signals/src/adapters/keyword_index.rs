//! In-memory keyword catalog of known fraud patterns
//!
//! A `PatternIndex` adapter that needs no vector store: each known pattern is
//! a set of keywords, and a claim matches a pattern when its search text
//! contains at least two of them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{
    CaseId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};

use crate::ports::{HistoricalMatch, PatternIndex};

/// Minimum keyword hits for a pattern to match
const MIN_KEYWORD_HITS: usize = 2;

/// A known fraud pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownPattern {
    pub case_id: CaseId,
    pub name: String,
    pub keywords: Vec<String>,
    /// Pattern-specific minimum similarity
    pub min_similarity: f64,
}

impl KnownPattern {
    pub fn new(case_id: &str, name: &str, keywords: &[&str], min_similarity: f64) -> Self {
        Self {
            case_id: CaseId::new(case_id),
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            min_similarity,
        }
    }

    /// Similarity of a lowercased text to this pattern, if it matches
    fn similarity(&self, text: &str) -> Option<(f64, Vec<&str>)> {
        let hits: Vec<&str> = self
            .keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .map(String::as_str)
            .collect();
        if hits.len() < MIN_KEYWORD_HITS {
            return None;
        }
        let similarity = (0.4 + 0.1 * hits.len() as f64).min(0.9);
        (similarity >= self.min_similarity).then_some((similarity, hits))
    }
}

/// Keyword-based pattern index
#[derive(Debug, Clone)]
pub struct KeywordPatternIndex {
    patterns: Vec<KnownPattern>,
}

impl KeywordPatternIndex {
    pub fn new(patterns: Vec<KnownPattern>) -> Self {
        Self { patterns }
    }

    /// Catalog of common auto and medical fraud schemes
    pub fn with_default_catalog() -> Self {
        Self::new(vec![
            KnownPattern::new(
                "FP-STAGED-ACCIDENT",
                "Staged Accident",
                &["sudden stop", "intentional", "pre-planned", "witness coaching"],
                0.7,
            ),
            KnownPattern::new(
                "FP-INFLATED-DAMAGES",
                "Inflated Damages",
                &["excessive", "unreasonable", "market value", "overpriced"],
                0.6,
            ),
            KnownPattern::new(
                "FP-PHANTOM-PASSENGER",
                "Phantom Passenger",
                &["additional passenger", "unbuckled", "not mentioned initially"],
                0.7,
            ),
            KnownPattern::new(
                "FP-PRIOR-DAMAGE",
                "Prior Damage Claim",
                &["pre-existing", "previous damage", "old injury", "prior claim"],
                0.6,
            ),
            KnownPattern::new(
                "FP-MEDICAL-MILL",
                "Medical Mill",
                &["multiple providers", "unnecessary treatment", "excessive therapy"],
                0.7,
            ),
            KnownPattern::new(
                "FP-RENT-A-CRASH",
                "Rent-a-Crash",
                &["rental car", "multiple claims", "short rental", "immediate accident"],
                0.75,
            ),
            KnownPattern::new(
                "FP-FRAUD-RING",
                "Insurance Fraud Ring",
                &["same location", "multiple claims", "connected parties", "coordinated"],
                0.8,
            ),
        ])
    }

    pub fn patterns(&self) -> &[KnownPattern] {
        &self.patterns
    }

    /// Matches sorted by similarity descending, truncated to `k`
    pub fn search(&self, query_text: &str, k: usize) -> Vec<HistoricalMatch> {
        let text = query_text.to_lowercase();
        let mut matches: Vec<HistoricalMatch> = self
            .patterns
            .iter()
            .filter_map(|pattern| {
                let (similarity, hits) = pattern.similarity(&text)?;
                Some(HistoricalMatch {
                    case_id: pattern.case_id.clone(),
                    similarity,
                    summary: format!("{} pattern (keywords: {})", pattern.name, hits.join(", ")),
                })
            })
            .collect();
        matches.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.case_id.cmp(&b.case_id))
        });
        matches.truncate(k);
        matches
    }
}

impl Default for KeywordPatternIndex {
    fn default() -> Self {
        Self::with_default_catalog()
    }
}

impl DomainPort for KeywordPatternIndex {}

#[async_trait]
impl HealthCheckable for KeywordPatternIndex {
    async fn health_check(&self) -> HealthCheckResult {
        if self.patterns.is_empty() {
            HealthCheckResult::unhealthy("keyword-pattern-index", "pattern catalog is empty")
        } else {
            HealthCheckResult::healthy("keyword-pattern-index")
        }
    }
}

#[async_trait]
impl PatternIndex for KeywordPatternIndex {
    async fn retrieve(
        &self,
        query_text: &str,
        k: usize,
        _metadata: &OperationMetadata,
    ) -> Result<Vec<HistoricalMatch>, PortError> {
        Ok(self.search(query_text, k))
    }
}
