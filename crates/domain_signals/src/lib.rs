//! Fraud Signal Domain
//!
//! This crate turns heterogeneous, partially unreliable evidence about a claim
//! into one explainable fraud score:
//!
//! - **Indicators**: the strictly typed signal every evaluator is normalized into
//! - **Normalizer**: boundary validation of raw findings (clamping, severity
//!   assignment, partial signal loss)
//! - **Evaluators**: inconsistency checks, historical pattern matching and
//!   photo authenticity consumption, each independent of the others
//! - **Scoring**: the pure risk scoring engine
//!
//! # Signal flow
//!
//! ```text
//! ClaimRecord ─┬─> InconsistencyEvaluator ──┐
//!              ├─> PatternEvaluator ────────┼─> SignalNormalizer ─> RiskScoringEngine
//!              └─> PhotoAuthenticityEvaluator┘
//! ```

pub mod indicator;
pub mod normalizer;
pub mod evaluator;
pub mod inconsistency;
pub mod pattern;
pub mod photo;
pub mod scoring;
pub mod config;
pub mod ports;
pub mod adapters;
pub mod error;

pub use indicator::{
    order_indicators, Evidence, IndicatorKind, Indicator, InconsistencyKind, PhotoCheck,
    Severity, SignalCategory,
};
pub use normalizer::{
    ConfidenceCorrection, NormalizedSignals, PartialSignalLoss, RawFinding, SignalNormalizer,
};
pub use evaluator::{EvaluationContext, SignalEvaluator, SoftSignalFailure};
pub use inconsistency::InconsistencyEvaluator;
pub use pattern::PatternEvaluator;
pub use photo::{authenticity_score, PhotoAuthenticityEvaluator, PhotoUpload};
pub use scoring::{
    CategoryContribution, Recommendation, RiskLevel, RiskScoringEngine, ScoreBreakdown,
    ScoreOutcome,
};
pub use config::{
    InconsistencyConfig, PatternConfig, PhotoConfig, ScoringConfig, SeverityThresholds,
};
pub use ports::{ClaimHistory, HistoricalMatch, PatternIndex, PhotoAnalyzer, PhotoAuthenticityReport};
pub use adapters::KeywordPatternIndex;
pub use error::{EvaluatorError, SignalError};
