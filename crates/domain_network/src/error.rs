//! Network domain errors

use thiserror::Error;

use core_kernel::ClaimId;

/// Errors raised by the claim network
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Claim {0} has not been ingested into the claim graph")]
    UnknownClaim(ClaimId),

    #[error("Invalid entity key: {0}")]
    InvalidEntityKey(String),
}
