//! Retry executor with exponential backoff, jitter, and an absolute deadline.
//!
//! A [`RetryPolicy`] calls an operation until it succeeds, the classifier
//! declares a failure fatal, the attempt budget runs out, or the next sleep
//! would cross the deadline.
//!
//! ```text
//! execute(op)
//!   reset run state
//!   loop:
//!     deadline_at = now + deadline        (first attempt only)
//!     op() ── Ok ─────────────────────────► Ok(value)
//!       └─ Err(e)
//!          classify(e) == Fatal ──────────► Err(Fatal(e))
//!          attempts == max ───────────────► Err(Exhausted)
//!          attempts += 1
//!          sleep = current + jitter
//!          now + sleep >= deadline_at ────► Err(DeadlineExceeded)
//!          sleeper.sleep(sleep)
//!          current = min(current × factor, max_delay)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::{Backoff, RetryError};
use crate::sleep::{InterruptibleSleep, Sleep};

/// Retry budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxAttempts {
    /// Retry until success, a fatal failure, or the deadline.
    Unlimited,
    /// Retry at most this many times after the first call.
    Bounded(u32),
}

impl MaxAttempts {
    /// Converts the `-1 = unlimited` convention used in configuration files.
    ///
    /// Returns `None` for other negative values.
    #[must_use]
    pub fn from_tries(tries: i64) -> Option<Self> {
        match tries {
            -1 => Some(Self::Unlimited),
            n => u32::try_from(n).ok().map(Self::Bounded),
        }
    }

    const fn is_spent(self, attempts: u32) -> bool {
        matches!(self, Self::Bounded(max) if attempts == max)
    }
}

impl Default for MaxAttempts {
    fn default() -> Self {
        Self::Bounded(1)
    }
}

/// Verdict of a failure classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Sleep and call the operation again.
    Retryable,
    /// Stop and hand the failure back unchanged.
    Fatal,
}

/// Maps an operation failure to a [`Verdict`].
pub type Classifier<E> = Arc<dyn Fn(&E) -> Verdict + Send + Sync>;

/// Mutable state of one retry sequence.
#[derive(Clone, Copy, Debug)]
struct RunState {
    attempts: u32,
    current_delay: Duration,
    deadline_at: Option<Instant>,
}

/// Stateful retry executor.
///
/// `execute` takes `&mut self`, so one policy drives one sequence at a time.
/// Use [`Clone`] for concurrent sequences: clones share configuration but
/// start with fresh run state.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use prometheus_resilience::core::{MaxAttempts, RetryError, RetryPolicy};
///
/// let mut policy = RetryPolicy::<String>::builder()
///     .max_attempts(MaxAttempts::Bounded(3))
///     .delay(Duration::from_millis(1))
///     .max_jitter(Duration::ZERO)
///     .build();
///
/// let mut calls = 0;
/// let result = policy.execute(|| {
///     calls += 1;
///     if calls < 3 { Err("not yet".to_string()) } else { Ok(calls) }
/// });
/// assert_eq!(result.unwrap(), 3);
///
/// let err = policy.execute(|| Err::<(), _>("down".to_string())).unwrap_err();
/// assert!(matches!(err, RetryError::Exhausted { attempts: 3 }));
/// ```
pub struct RetryPolicy<E> {
    max_attempts: MaxAttempts,
    backoff: Backoff,
    deadline: Option<Duration>,
    classifier: Classifier<E>,
    sleeper: Arc<dyn Sleep>,
    state: RunState,
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .field("deadline", &self.deadline)
            .field("attempts", &self.state.attempts)
            .field("current_delay", &self.state.current_delay)
            .finish_non_exhaustive()
    }
}

impl<E> Clone for RetryPolicy<E> {
    /// Same configuration, fresh run state.
    fn clone(&self) -> Self {
        Self::from_parts(
            self.max_attempts,
            self.backoff,
            self.deadline,
            Arc::clone(&self.classifier),
            Arc::clone(&self.sleeper),
        )
    }
}

impl<E: 'static> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self::from_parts(
            MaxAttempts::default(),
            Backoff::default(),
            None,
            retry_all(),
            Arc::new(InterruptibleSleep::default()),
        )
    }
}

/// Classifier treating every failure as retryable.
#[must_use]
pub fn retry_all<E: 'static>() -> Classifier<E> {
    Arc::new(|_: &E| Verdict::Retryable)
}

impl<E: 'static> RetryPolicy<E> {
    /// Starts a [`RetryPolicyBuilder`](crate::builders::RetryPolicyBuilder).
    #[must_use]
    pub fn builder() -> crate::builders::RetryPolicyBuilder<E> {
        crate::builders::RetryPolicyBuilder::new()
    }
}

impl<E> RetryPolicy<E> {
    pub(crate) fn from_parts(
        max_attempts: MaxAttempts,
        backoff: Backoff,
        deadline: Option<Duration>,
        classifier: Classifier<E>,
        sleeper: Arc<dyn Sleep>,
    ) -> Self {
        Self {
            max_attempts,
            backoff,
            deadline,
            classifier,
            sleeper,
            state: RunState {
                attempts: 0,
                current_delay: backoff.first(),
                deadline_at: None,
            },
        }
    }

    /// Retry budget.
    pub const fn max_attempts(&self) -> MaxAttempts {
        self.max_attempts
    }

    /// Delay schedule.
    pub const fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Deadline measured from the first attempt.
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Retries performed in the current (or last) sequence.
    pub const fn attempts(&self) -> u32 {
        self.state.attempts
    }

    /// Pre-jitter delay the next retry would use.
    pub const fn current_delay(&self) -> Duration {
        self.state.current_delay
    }

    /// Clears the attempt counter, delay, and deadline.
    pub fn reset(&mut self) {
        self.state = RunState {
            attempts: 0,
            current_delay: self.backoff.first(),
            deadline_at: None,
        };
    }

    /// Runs `operation` until it succeeds or the policy gives up.
    ///
    /// # Errors
    /// - [`RetryError::Fatal`] with the operation's error when the classifier
    ///   says [`Verdict::Fatal`];
    /// - [`RetryError::Exhausted`] when the attempt budget is spent;
    /// - [`RetryError::DeadlineExceeded`] when the next sleep would end at or
    ///   past the deadline. No sleep happens in that case.
    pub fn execute<T, F>(&mut self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.reset();

        loop {
            // A deadline past the clock's range never fires.
            if let (Some(deadline), None) = (self.deadline, self.state.deadline_at) {
                self.state.deadline_at = Instant::now().checked_add(deadline);
            }

            let err = match operation() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if (self.classifier)(&err) == Verdict::Fatal {
                return Err(RetryError::Fatal(err));
            }

            if self.max_attempts.is_spent(self.state.attempts) {
                tracing::warn!(attempts = self.state.attempts, "too many retry attempts");
                return Err(RetryError::Exhausted {
                    attempts: self.state.attempts,
                });
            }
            self.state.attempts += 1;

            let sleep = self.backoff.sleep_for(self.state.current_delay);
            if let (Some(deadline), Some(at)) = (self.deadline, self.state.deadline_at) {
                if Instant::now().checked_add(sleep).is_none_or(|wake| wake >= at) {
                    tracing::warn!(
                        attempts = self.state.attempts,
                        ?deadline,
                        "exceeded retry deadline"
                    );
                    return Err(RetryError::DeadlineExceeded { deadline });
                }
            }

            tracing::debug!(
                attempt = self.state.attempts,
                sleep_ms = u64::try_from(sleep.as_millis()).unwrap_or(u64::MAX),
                "retrying after failure"
            );
            self.sleeper.sleep(sleep);
            self.state.current_delay = self.backoff.grow(self.state.current_delay);
        }
    }
}
