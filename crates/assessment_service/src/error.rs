//! Assessment errors
//!
//! Only cancellation and configuration problems surface as `Err` to callers.
//! Everything that goes wrong inside a run is recorded on the returned
//! assessment instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{CoreError, RunId};
use domain_claims::{ClaimError, ExtractionError};
use domain_signals::SignalCategory;

/// Errors returned by the assessment engine
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Assessment run {run_id} was cancelled")]
    Cancelled { run_id: RunId },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Configuration could not be loaded: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Tracing could not be initialised: {0}")]
    Telemetry(String),
}

impl From<CoreError> for AssessmentError {
    fn from(err: CoreError) -> Self {
        AssessmentError::Configuration(err.to_string())
    }
}

impl AssessmentError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AssessmentError::Cancelled { .. })
    }
}

/// Unrecoverable failure of one run, recorded on its assessment
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HardRunFailure {
    #[error("claim record is missing required identifier: {field}")]
    MissingIdentifier { field: String },

    #[error("claim record is invalid: {}", .errors.join("; "))]
    InvalidRecord { errors: Vec<String> },

    #[error("claim extraction failed: {reason}")]
    ExtractionFailed { reason: String },

    #[error("{category} evaluator failed: {reason}")]
    EvaluatorFatal {
        category: SignalCategory,
        reason: String,
    },

    #[error("{branch} branch panicked")]
    BranchPanicked { branch: String },
}

impl From<ClaimError> for HardRunFailure {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::MissingIdentifier(field) => HardRunFailure::MissingIdentifier {
                field: field.to_string(),
            },
            ClaimError::InvalidRecord(errors) => HardRunFailure::InvalidRecord { errors },
            ClaimError::UnknownCategory(name) => HardRunFailure::InvalidRecord {
                errors: vec![format!("category: unknown claim category '{}'", name)],
            },
        }
    }
}

impl From<ExtractionError> for HardRunFailure {
    fn from(err: ExtractionError) -> Self {
        HardRunFailure::ExtractionFailed {
            reason: err.to_string(),
        }
    }
}
