//! Claims domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that make a claim record unusable for assessment
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim record is missing required identifier: {0}")]
    MissingIdentifier(&'static str),

    #[error("Claim record is invalid: {}", .0.join("; "))]
    InvalidRecord(Vec<String>),

    #[error("Unknown claim category: {0}")]
    UnknownCategory(String),
}

/// Errors returned by the document extraction collaborator
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Document could not be read: {0}")]
    Unreadable(String),

    #[error("Extraction produced no value for: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error(transparent)]
    Port(#[from] PortError),
}
