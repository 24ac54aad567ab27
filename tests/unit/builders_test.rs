//! Tests for builder modules

use std::time::Duration;

use prometheus_resilience::builders::RetryPolicyBuilder;
use prometheus_resilience::config::RetryConfig;
use prometheus_resilience::core::{MaxAttempts, RetryError, RetryPolicy};

#[test]
fn test_retry_builder_defaults() {
    let policy: RetryPolicy<String> = RetryPolicyBuilder::new().build();
    assert_eq!(policy.max_attempts(), MaxAttempts::Bounded(1));
    assert_eq!(policy.backoff().delay, Duration::from_millis(100));
    assert_eq!(policy.backoff().factor, 2.0);
    assert_eq!(policy.backoff().max_jitter, Duration::from_millis(800));
    assert_eq!(policy.backoff().max_delay, Duration::from_secs(3600));
    assert_eq!(policy.deadline(), None);
}

#[test]
fn test_retry_builder_from_config() {
    let cfg = RetryConfig {
        max_tries: -1,
        delay_secs: 1.5,
        backoff: 3.0,
        max_jitter_secs: 0.0,
        max_delay_secs: 60.0,
        deadline_secs: Some(30.0),
    };

    let policy: RetryPolicy<String> = RetryPolicyBuilder::from_config(&cfg).unwrap().build();
    assert_eq!(policy.max_attempts(), MaxAttempts::Unlimited);
    assert_eq!(policy.backoff().delay, Duration::from_millis(1_500));
    assert_eq!(policy.backoff().factor, 3.0);
    assert_eq!(policy.backoff().max_jitter, Duration::ZERO);
    assert_eq!(policy.backoff().max_delay, Duration::from_secs(60));
    assert_eq!(policy.deadline(), Some(Duration::from_secs(30)));
}

#[test]
fn test_retry_builder_from_invalid_config() {
    let cfg = RetryConfig {
        max_delay_secs: -1.0,
        ..RetryConfig::default()
    };
    assert!(RetryPolicyBuilder::<String>::from_config(&cfg).is_err());
}

#[test]
fn test_retry_if_marks_rest_fatal() {
    let mut policy = RetryPolicyBuilder::new()
        .max_attempts(MaxAttempts::Unlimited)
        .delay(Duration::ZERO)
        .max_jitter(Duration::ZERO)
        .retry_if(|e: &i32| *e < 0)
        .build();

    let mut calls = 0;
    let result: Result<(), _> = policy.execute(|| {
        calls += 1;
        Err(if calls < 4 { -1 } else { 42 })
    });

    assert!(matches!(result, Err(RetryError::Fatal(42))));
    assert_eq!(calls, 4);
}

#[test]
fn test_far_deadline_from_config_runs() {
    let cfg = RetryConfig {
        delay_secs: 0.0,
        max_jitter_secs: 0.0,
        deadline_secs: Some(1.0e19),
        ..RetryConfig::default()
    };
    assert!(cfg.validate().is_ok());

    let mut policy: RetryPolicy<String> = RetryPolicyBuilder::from_config(&cfg).unwrap().build();
    assert_eq!(policy.execute(|| Ok(1)).unwrap(), 1);

    let result: Result<(), _> = policy.execute(|| Err("down".to_string()));
    assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1 })));
}

#[test]
fn test_max_deadline_from_builder_runs() {
    let mut policy = RetryPolicyBuilder::new()
        .max_attempts(MaxAttempts::Bounded(2))
        .delay(Duration::ZERO)
        .max_jitter(Duration::ZERO)
        .deadline(Some(Duration::MAX))
        .build();

    let mut calls = 0;
    let result = policy.execute(|| {
        calls += 1;
        if calls < 3 { Err("down") } else { Ok(calls) }
    });
    assert_eq!(result.unwrap(), 3);
}
