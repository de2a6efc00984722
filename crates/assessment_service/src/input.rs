//! Assessment run input

use core_kernel::ClaimId;
use domain_claims::ClaimRecord;
use domain_signals::PhotoUpload;

/// Where the claim record of a run comes from
#[derive(Debug, Clone)]
pub enum ClaimSource {
    /// An already structured record
    Record(ClaimRecord),
    /// A claim document to be sent through the extractor
    Document { reference: ClaimId, bytes: Vec<u8> },
}

/// Everything one assessment run needs
#[derive(Debug, Clone)]
pub struct ClaimInput {
    pub source: ClaimSource,
    pub photos: Vec<PhotoUpload>,
}

impl ClaimInput {
    pub fn record(record: ClaimRecord) -> Self {
        Self {
            source: ClaimSource::Record(record),
            photos: Vec::new(),
        }
    }

    pub fn document(reference: impl Into<ClaimId>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: ClaimSource::Document {
                reference: reference.into(),
                bytes: bytes.into(),
            },
            photos: Vec::new(),
        }
    }

    pub fn with_photos(mut self, photos: Vec<PhotoUpload>) -> Self {
        self.photos = photos;
        self
    }

    /// Claim reference known before extraction, if any
    pub fn reference(&self) -> &ClaimId {
        match &self.source {
            ClaimSource::Record(record) => &record.claim_id,
            ClaimSource::Document { reference, .. } => reference,
        }
    }
}
