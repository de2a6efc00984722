//! Kernel error tests

use core_kernel::error::CoreError;

#[test]
fn configuration_error_names_the_offending_setting() {
    let error = CoreError::configuration("scoring.risk_thresholds must ascend");

    assert!(error.is_configuration());
    assert_eq!(
        error.to_string(),
        "Configuration error: scoring.risk_thresholds must ascend"
    );
}

#[test]
fn invalid_transition_keeps_its_message() {
    let error = CoreError::invalid_state("complete -> scoring");

    assert!(!error.is_configuration());
    match error {
        CoreError::InvalidStateTransition(msg) => assert_eq!(msg, "complete -> scoring"),
        other => panic!("unexpected error: {other:?}"),
    }
}
