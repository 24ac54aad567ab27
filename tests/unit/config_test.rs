//! Tests for configuration validation

use std::time::Duration;

use prometheus_resilience::config::RetryConfig;
use prometheus_resilience::core::MaxAttempts;

#[test]
fn test_retry_config_defaults_are_valid() {
    let cfg = RetryConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.max_attempts(), MaxAttempts::Bounded(1));
    assert_eq!(cfg.base_delay(), Duration::from_millis(100));
    assert_eq!(cfg.max_jitter(), Duration::from_millis(800));
    assert_eq!(cfg.max_delay(), Duration::from_secs(3600));
    assert_eq!(cfg.deadline(), None);
}

#[test]
fn test_retry_config_unlimited() {
    let cfg = RetryConfig {
        max_tries: -1,
        ..RetryConfig::default()
    };
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.max_attempts(), MaxAttempts::Unlimited);
}

#[test]
fn test_retry_config_invalid_max_tries() {
    let invalid = RetryConfig {
        max_tries: -2,
        ..RetryConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_retry_config_invalid_delay() {
    let invalid = RetryConfig {
        delay_secs: -0.5,
        ..RetryConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_retry_config_invalid_backoff() {
    let invalid = RetryConfig {
        backoff: f64::NAN,
        ..RetryConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_retry_config_invalid_deadline() {
    let invalid = RetryConfig {
        deadline_secs: Some(f64::INFINITY),
        ..RetryConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_retry_config_from_json() {
    let json = r#"{
        "max_tries": 5,
        "delay_secs": 0.25,
        "deadline_secs": 10
    }"#;

    let cfg = RetryConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.max_attempts(), MaxAttempts::Bounded(5));
    assert_eq!(cfg.base_delay(), Duration::from_millis(250));
    assert_eq!(cfg.backoff, 2.0);
    assert_eq!(cfg.deadline(), Some(Duration::from_secs(10)));
}

#[test]
fn test_retry_config_from_json_rejects_invalid() {
    assert!(RetryConfig::from_json_str(r#"{ "max_tries": -3 }"#).is_err());
    assert!(RetryConfig::from_json_str("not json").is_err());
}
