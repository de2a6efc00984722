//! Signal domain errors

use thiserror::Error;

use core_kernel::PortError;

use crate::indicator::SignalCategory;

/// Errors raised while constructing an indicator
#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("Confidence must be a finite value in [0, 1], got {0}")]
    InvalidConfidence(f64),

    #[error("Indicator rationale must not be empty")]
    MissingRationale,
}

/// Errors returned by a signal evaluator
///
/// `Soft` degrades the category and lets the run continue. `Fatal` means the
/// evaluator's output cannot be trusted at all and fails the run.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("{category} evaluator degraded: {reason}")]
    Soft {
        category: SignalCategory,
        reason: String,
    },

    #[error("{category} evaluator failed: {reason}")]
    Fatal {
        category: SignalCategory,
        reason: String,
    },
}

impl EvaluatorError {
    pub fn soft(category: SignalCategory, reason: impl Into<String>) -> Self {
        EvaluatorError::Soft {
            category,
            reason: reason.into(),
        }
    }

    pub fn fatal(category: SignalCategory, reason: impl Into<String>) -> Self {
        EvaluatorError::Fatal {
            category,
            reason: reason.into(),
        }
    }

    /// Classifies a collaborator error.
    ///
    /// Contract violations are fatal; everything else (transient, not found,
    /// internal) only degrades the category.
    pub fn from_port(category: SignalCategory, error: PortError) -> Self {
        if error.is_contract_violation() {
            Self::fatal(category, error.to_string())
        } else {
            Self::soft(category, error.to_string())
        }
    }

    pub fn category(&self) -> SignalCategory {
        match self {
            EvaluatorError::Soft { category, .. } | EvaluatorError::Fatal { category, .. } => {
                *category
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, EvaluatorError::Fatal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_port_classification() {
        let soft = EvaluatorError::from_port(
            SignalCategory::PatternMatch,
            PortError::timeout("retrieve", 5000),
        );
        assert!(!soft.is_fatal());
        assert_eq!(soft.category(), SignalCategory::PatternMatch);

        let missing = EvaluatorError::from_port(
            SignalCategory::Inconsistency,
            PortError::not_found("ClaimHistory", "PTY-1"),
        );
        assert!(!missing.is_fatal());

        let fatal = EvaluatorError::from_port(
            SignalCategory::PhotoAuthenticity,
            PortError::transformation("score out of range"),
        );
        assert!(fatal.is_fatal());
        assert!(fatal.to_string().contains("photo_authenticity"));
    }
}
