//! Core Kernel - Foundational types shared by the claim risk engine
//!
//! This crate provides the building blocks used across all domain modules:
//! - Strongly-typed identifiers for claims, parties, historical cases and runs
//! - The port contract (`PortError`, `DomainPort`, `HealthCheckable`) every
//!   external collaborator adapter implements
//! - The kernel error type, including configuration failures

pub mod identifiers;
pub mod ports;
pub mod error;

pub use identifiers::{ClaimId, ClaimantId, ProviderId, CaseId, RunId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use error::CoreError;
