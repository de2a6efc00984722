//! Claim Record Domain
//!
//! This crate models the structured claim that the risk engine assesses. A
//! `ClaimRecord` is produced by an external document-understanding service
//! (behind the `DocumentExtractor` port) and is immutable for the duration of
//! an assessment run.
//!
//! # Intake
//!
//! ```text
//! document bytes -> DocumentExtractor -> ClaimRecord -> ClaimValidator -> assessment
//! ```

pub mod claim;
pub mod validation;
pub mod ports;
pub mod error;

pub use claim::{ClaimRecord, ClaimCategory, Attachment, AttachmentKind};
pub use validation::{ClaimValidator, ValidationResult};
pub use ports::DocumentExtractor;
pub use error::{ClaimError, ExtractionError};
