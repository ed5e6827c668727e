//! Property-based tests for error classification.

use proptest::prelude::*;
use simdrive_errors::{
    BackendError, DeviceError, ErrorContext, ErrorSeverity, SimDriveError, ValidationError,
};

fn severity_from(n: u8) -> ErrorSeverity {
    match n {
        0 => ErrorSeverity::Info,
        1 => ErrorSeverity::Warning,
        2 => ErrorSeverity::Error,
        _ => ErrorSeverity::Critical,
    }
}

proptest! {
    #[test]
    fn test_error_severity_ordering(a in 0u8..=3, b in 0u8..=3) {
        prop_assert_eq!(a.cmp(&b), severity_from(a).cmp(&severity_from(b)));
    }

    #[test]
    fn test_hardware_errors_always_recoverable(
        device in 0usize..16,
        axis in 0usize..64,
        available in 0usize..64,
    ) {
        let err: SimDriveError = DeviceError::axis_out_of_range(device, axis, available).into();
        prop_assert!(err.is_recoverable());
    }

    #[test]
    fn test_connection_loss_never_recoverable(reason in ".*") {
        let err: SimDriveError = BackendError::connection_lost(reason).into();
        prop_assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_context_preserves_operation(operation in "[a-z_]{1,24}") {
        let ctx = ErrorContext::new(&operation);
        prop_assert!(ctx.to_string().contains(&operation));
    }

    #[test]
    fn test_required_display_mentions_field(field in "[a-z_.]{1,32}") {
        let msg = ValidationError::required(field.clone()).to_string();
        prop_assert!(msg.contains(&field));
    }
}
