//! Exponential backoff with additive jitter.
//!
//! [`Backoff`] holds the fixed knobs of a retry policy's delay schedule:
//! - [`Backoff::delay`] the initial delay;
//! - [`Backoff::factor`] the multiplicative growth factor;
//! - [`Backoff::max_delay`] the cap;
//! - [`Backoff::max_jitter`] the upper bound of the random addition.
//!
//! The retry loop keeps its own `current` delay. Each round sleeps for
//! `current + jitter`, and the next round uses [`Backoff::grow`]`(current)`.
//! Jitter never feeds back into the schedule.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use prometheus_resilience::core::Backoff;
//!
//! let backoff = Backoff {
//!     delay: Duration::from_millis(100),
//!     factor: 2.0,
//!     max_delay: Duration::from_millis(300),
//!     max_jitter: Duration::ZERO,
//! };
//!
//! let first = backoff.first();
//! assert_eq!(first, Duration::from_millis(100));
//! assert_eq!(backoff.grow(first), Duration::from_millis(200));
//! assert_eq!(backoff.grow(Duration::from_millis(200)), Duration::from_millis(300));
//! ```

use std::time::Duration;

use rand::Rng;

/// Delay schedule for a retry policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backoff {
    /// Delay before the first retry.
    pub delay: Duration,
    /// Multiplier applied after each retry.
    pub factor: f64,
    /// Cap on the pre-jitter delay.
    pub max_delay: Duration,
    /// Upper bound of the uniform random addition.
    pub max_jitter: Duration,
}

impl Default for Backoff {
    /// `100ms`, doubling, capped at one hour, up to `800ms` of jitter.
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            factor: 2.0,
            max_delay: Duration::from_secs(3600),
            max_jitter: Duration::from_millis(800),
        }
    }
}

const JITTER_STEP_MS: u64 = 10;

impl Backoff {
    /// Delay used for the first retry, clamped to [`Backoff::max_delay`].
    #[must_use]
    pub fn first(&self) -> Duration {
        self.delay.min(self.max_delay)
    }

    /// Next pre-jitter delay: `current × factor`, clamped to [`Backoff::max_delay`].
    ///
    /// Non-finite or out-of-range products clamp to the cap.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn grow(&self, current: Duration) -> Duration {
        let nanos = current.as_nanos() as f64 * self.factor;
        if !nanos.is_finite() || nanos < 0.0 || nanos >= self.max_delay.as_nanos() as f64 {
            return self.max_delay;
        }
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Uniform random jitter in `[0, max_jitter]`, in whole 10ms steps.
    ///
    /// A bound below one step yields no jitter.
    #[must_use]
    pub fn jitter(&self) -> Duration {
        let steps = u64::try_from(self.max_jitter.as_millis() / u128::from(JITTER_STEP_MS)).unwrap_or(u64::MAX);
        if steps == 0 {
            return Duration::ZERO;
        }
        let drawn = rand::rng().random_range(0..=steps);
        Duration::from_millis(drawn.saturating_mul(JITTER_STEP_MS))
    }

    /// Sleep for a round whose pre-jitter delay is `current`.
    #[must_use]
    pub fn sleep_for(&self, current: Duration) -> Duration {
        current.saturating_add(self.jitter())
    }
}
