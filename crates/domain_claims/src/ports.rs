//! Claim intake port
//!
//! Document understanding is an external collaborator. The engine only
//! requires that it turns raw document bytes into a `ClaimRecord`.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata};

use crate::claim::ClaimRecord;
use crate::error::ExtractionError;

/// Port for the document extraction service
#[async_trait]
pub trait DocumentExtractor: DomainPort + HealthCheckable {
    /// Extracts a structured claim record from a claim document
    ///
    /// # Arguments
    ///
    /// * `document` - Raw document bytes (PDF, image scan)
    /// * `metadata` - Correlation metadata for tracing
    async fn extract(
        &self,
        document: &[u8],
        metadata: &OperationMetadata,
    ) -> Result<ClaimRecord, ExtractionError>;
}
