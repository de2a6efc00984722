//! Kernel errors shared by the domain crates

use thiserror::Error;

/// Errors raised while setting up or driving an assessment
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration section failed validation at load time
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidStateTransition(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, CoreError::Configuration(_))
    }
}
