//! Claim record validation
//!
//! A record must carry the identifiers the risk engine keys on; without them
//! neither the entity graph nor the assessment can be attributed. Everything
//! else that looks odd is a warning: the evaluators, not the validator, decide
//! whether an oddity is a fraud signal.
//!
//! # Errors
//! - Blank claim, claimant or provider reference
//! - Negative claimed amount
//!
//! # Warnings
//! - Empty narrative (narrative checks and pattern retrieval have little to work with)
//! - No address, phone or bank account (the claim cannot link to others in the graph)

use rust_decimal::Decimal;

use crate::claim::ClaimRecord;
use crate::error::ClaimError;

/// Result of claim record validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the record is usable
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal issues)
    pub warnings: Vec<String>,
    /// First missing identifier, if any
    missing_identifier: Option<&'static str>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            missing_identifier: None,
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    fn add_missing_identifier(&mut self, field: &'static str) {
        self.add_error(format!("{} is required", field));
        self.missing_identifier.get_or_insert(field);
    }

    /// Converts the result into the error the orchestrator records on a failed run
    pub fn into_result(self) -> Result<Vec<String>, ClaimError> {
        if let Some(field) = self.missing_identifier {
            return Err(ClaimError::MissingIdentifier(field));
        }
        if !self.is_valid {
            return Err(ClaimError::InvalidRecord(self.errors));
        }
        Ok(self.warnings)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Validator for claim records
pub struct ClaimValidator;

impl ClaimValidator {
    /// Validates a claim record before assessment
    pub fn validate(record: &ClaimRecord) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if record.claim_id.is_blank() {
            result.add_missing_identifier("claim_id");
        }
        if record.claimant_id.is_blank() {
            result.add_missing_identifier("claimant_id");
        }
        if record.provider_id.is_blank() {
            result.add_missing_identifier("provider_id");
        }

        if record.claimed_amount < Decimal::ZERO {
            result.add_error(format!(
                "claimed_amount must not be negative (got {})",
                record.claimed_amount
            ));
        }

        if record.narrative.trim().is_empty() {
            result.add_warning("narrative is empty");
        }

        let has_link = [&record.address, &record.phone, &record.bank_account]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()));
        if !has_link {
            result.add_warning("no address, phone or bank account to link against other claims");
        }

        if !result.is_valid {
            tracing::debug!(
                claim_id = %record.claim_id,
                errors = ?result.errors,
                "Claim record failed validation"
            );
        }

        result
    }
}
