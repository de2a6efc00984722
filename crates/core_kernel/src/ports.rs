//! Collaborator Ports
//!
//! The risk engine consumes several external collaborators: document
//! extraction, photo authenticity analysis, the historical fraud-case index,
//! and narrative generation. Each domain defines a port trait for the
//! collaborator it needs; adapters (remote services, in-memory catalogs, test
//! doubles) implement those traits.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Assessment Orchestrator                │
//! └──────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                     Port Traits                        │
//! │  DocumentExtractor, PatternIndex, PhotoAnalyzer, ...   │
//! └──────────────────────────────────────────────────────┘
//!               ▲                          ▲
//!     ┌─────────┴────────┐      ┌─────────┴─────────┐
//!     │ In-memory adapter │      │  Remote adapter    │
//!     │ (keyword catalog) │      │  (vector index)    │
//!     └──────────────────┘      └───────────────────┘
//! ```
//!
//! Every port returns `PortError`, so the orchestrator can classify any
//! collaborator failure as transient (degrade the signal) or as a contract
//! violation (fail the run) without knowing which adapter produced it.

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Failure reported by a collaborator adapter
#[derive(Debug, Error)]
pub enum PortError {
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// The collaborator rejected the request
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reported by the collaborator itself; the engine's own evaluator
    /// timeouts never produce a `PortError`
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    /// The response broke the port contract (malformed payload, NaN scores)
    #[error("Transformation error: {message}")]
    Transformation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::ServiceUnavailable {
            service: service.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        PortError::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// Failures that may go away on their own
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Failures meaning the collaborator's output cannot be trusted at all
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            PortError::Transformation { .. }
                | PortError::Unauthorized { .. }
                | PortError::Validation { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all collaborator ports
///
/// All port traits extend this marker so adapters can be shared across
/// concurrently running assessment tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    /// Answering, but slowly or with partial results
    Degraded,
    Unhealthy,
}

/// Outcome of probing one adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    /// Healthy result for adapters that have nothing remote to probe
    pub fn healthy(adapter_id: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn unhealthy(adapter_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Unhealthy,
            latency_ms: 0,
            message: Some(message.into()),
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

/// Adapters that can report their own health
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

/// Correlation data passed along with every collaborator call
#[derive(Debug, Clone, Default)]
pub struct OperationMetadata {
    /// Usually the assessment run id
    pub correlation_id: Option<String>,
    pub context: std::collections::HashMap<String, String>,
}

impl OperationMetadata {
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}
