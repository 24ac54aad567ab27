//! Lease expiration timestamps and time-to-live.
//!
//! Lease holders publish their expiration as
//! `YYYY-MM-DDTHH:MM:SS.ffffff` followed by any number of further fractional
//! digits and a literal `Z`, for example `2015-06-10T12:56:30.552539016Z`.
//! Digits beyond the sixth fractional place are dropped, not rounded.

use chrono::{DateTime, NaiveDate, Utc};

/// Length of `YYYY-MM-DDTHH:MM:SS.ffffff`.
const FIXED_LEN: usize = 26;

/// Separator bytes and their positions inside the fixed part.
const SEPARATORS: [(usize, u8); 6] = [(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':'), (19, b'.')];

/// Parses a lease expiration timestamp.
///
/// Returns `None` if `text` deviates from the format in any way, or names a
/// calendar date/time that does not exist.
///
/// # Examples
///
/// ```
/// use chrono::{Datelike, Timelike};
/// use prometheus_resilience::lease::parse_timestamp;
///
/// let ts = parse_timestamp("2015-06-10T12:56:30.552539016Z").unwrap();
/// assert_eq!((ts.year(), ts.month(), ts.day()), (2015, 6, 10));
/// assert_eq!(ts.nanosecond() / 1_000, 552_539);
///
/// assert!(parse_timestamp("2015-06-10 12:56:30.552539016Z").is_none());
/// ```
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let bytes = text.as_bytes();
    let (&last, body) = bytes.split_last()?;
    if last != b'Z' || body.len() < FIXED_LEN {
        return None;
    }
    let (fixed, extra) = body.split_at(FIXED_LEN);
    if !extra.iter().all(u8::is_ascii_digit) {
        return None;
    }
    for (i, &b) in fixed.iter().enumerate() {
        let ok = match SEPARATORS.iter().find(|(pos, _)| *pos == i) {
            Some(&(_, sep)) => b == sep,
            None => b.is_ascii_digit(),
        };
        if !ok {
            return None;
        }
    }

    let field = |from: usize, to: usize| -> u32 {
        fixed[from..to]
            .iter()
            .fold(0, |acc, &d| acc * 10 + u32::from(d - b'0'))
    };
    let year = i32::try_from(field(0, 4)).ok()?;
    NaiveDate::from_ymd_opt(year, field(5, 7), field(8, 10))?
        .and_hms_micro_opt(field(11, 13), field(14, 16), field(17, 19), field(20, 26))
        .map(|naive| naive.and_utc())
}

/// Whole seconds until `expiration`, measured from now.
///
/// Negative once the lease has expired. `None` when no expiration was given
/// or it does not parse.
///
/// # Examples
///
/// ```
/// use prometheus_resilience::lease::calculate_ttl;
///
/// assert_eq!(calculate_ttl(None), None);
/// assert_eq!(calculate_ttl(Some("2015-06-10 12:56:30.552539016Z")), None);
/// assert!(calculate_ttl(Some("2015-06-10T12:56:30.552539016Z")).unwrap() < 0);
/// ```
#[must_use]
pub fn calculate_ttl(expiration: Option<&str>) -> Option<i64> {
    calculate_ttl_at(expiration, Utc::now())
}

/// [`calculate_ttl`] against a fixed `now`.
///
/// The difference is floored, so a lease 0.5 s past expiry yields `-1`.
#[must_use]
pub fn calculate_ttl_at(expiration: Option<&str>, now: DateTime<Utc>) -> Option<i64> {
    let expiration = parse_timestamp(expiration.filter(|s| !s.is_empty())?)?;
    let micros = (expiration - now).num_microseconds()?;
    Some(micros.div_euclid(1_000_000))
}
