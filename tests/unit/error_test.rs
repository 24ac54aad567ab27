//! Tests for error types

use std::time::Duration;

use prometheus_resilience::core::{RetryError, SignalError};

#[test]
fn test_exhausted_error() {
    let err: RetryError<String> = RetryError::Exhausted { attempts: 3 };
    assert_eq!(format!("{}", err), "too many retry attempts (3)");
    assert_eq!(err.as_label(), "retry_exhausted");
    assert!(!err.is_fatal());
}

#[test]
fn test_deadline_exceeded_error() {
    let err: RetryError<String> = RetryError::DeadlineExceeded {
        deadline: Duration::from_secs(2),
    };
    assert_eq!(format!("{}", err), "exceeded retry deadline (2s)");
    assert_eq!(err.as_label(), "retry_deadline_exceeded");
    assert!(err.into_fatal().is_none());
}

#[test]
fn test_fatal_error_displays_inner() {
    let err = RetryError::Fatal("connection refused".to_string());
    assert_eq!(format!("{}", err), "connection refused");
    assert!(err.is_fatal());
    assert_eq!(err.into_fatal().as_deref(), Some("connection refused"));
}

#[test]
fn test_signal_errors() {
    assert_eq!(
        format!("{}", SignalError::AlreadyInstalled),
        "signal handlers already installed"
    );
    let os = SignalError::from(std::io::Error::from_raw_os_error(22));
    assert!(format!("{}", os).starts_with("os error: "));
}
