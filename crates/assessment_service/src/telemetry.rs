//! Tracing initialisation

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AssessmentError;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`; an unparsable level falls
/// back to `info`.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
/// * `json` - Emit one JSON object per event instead of human-readable lines
///
/// # Errors
///
/// Returns `AssessmentError::Telemetry` if a global subscriber is already set.
pub fn init_tracing(log_level: &str, json: bool) -> Result<(), AssessmentError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = json.then(|| fmt::layer().json().with_target(true));
    let text_layer = (!json).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| AssessmentError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_initialisation_is_an_error() {
        // The first call may lose to another test in this binary
        let _ = init_tracing("debug", false);
        let second = init_tracing("debug", true);
        assert!(matches!(second, Err(AssessmentError::Telemetry(_))));
    }
}
