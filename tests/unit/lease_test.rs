//! Tests for lease timestamps and TTL

use chrono::{Datelike, Duration, TimeZone, Timelike, Utc};

use prometheus_resilience::lease::{calculate_ttl, calculate_ttl_at, parse_timestamp};

#[test]
fn test_parse_reference_timestamp() {
    let ts = parse_timestamp("2015-06-10T12:56:30.552539016Z").unwrap();
    assert_eq!(ts.year(), 2015);
    assert_eq!(ts.month(), 6);
    assert_eq!(ts.day(), 10);
    assert_eq!(ts.hour(), 12);
    assert_eq!(ts.minute(), 56);
    assert_eq!(ts.second(), 30);
    assert_eq!(ts.nanosecond() / 1_000, 552_539);
}

#[test]
fn test_parse_space_separator_rejected() {
    assert!(parse_timestamp("2015-06-10 12:56:30.552539016Z").is_none());
}

#[test]
fn test_ttl_none_and_past() {
    assert_eq!(calculate_ttl(None), None);
    assert_eq!(calculate_ttl(Some("2015-06-10 12:56:30.552539016Z")), None);
    assert!(calculate_ttl(Some("2015-06-10T12:56:30.552539016Z")).unwrap() < 0);
}

#[test]
fn test_ttl_is_deterministic_for_fixed_now() {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let lease = "2030-01-01T00:00:42.000000123Z";
    assert_eq!(calculate_ttl_at(Some(lease), now), Some(42));
    assert_eq!(calculate_ttl_at(Some(lease), now), Some(42));
    assert_eq!(
        calculate_ttl_at(Some(lease), now + Duration::seconds(50)),
        Some(-8)
    );
}
