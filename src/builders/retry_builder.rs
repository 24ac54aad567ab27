//! Fluent construction of [`RetryPolicy`] values.

use std::sync::Arc;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::core::{retry_all, Backoff, Classifier, MaxAttempts, RetryPolicy, Verdict};
use crate::sleep::{InterruptibleSleep, Sleep};

/// Builder for [`RetryPolicy`].
///
/// Defaults: one retry, `100ms` initial delay doubling per retry, capped at
/// one hour, up to `800ms` of jitter, no deadline, every failure retryable,
/// sleeping through an [`InterruptibleSleep`] on the process coordinator.
pub struct RetryPolicyBuilder<E> {
    max_attempts: MaxAttempts,
    backoff: Backoff,
    deadline: Option<Duration>,
    classifier: Classifier<E>,
    sleeper: Option<Arc<dyn Sleep>>,
}

impl<E: 'static> Default for RetryPolicyBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> RetryPolicyBuilder<E> {
    /// Builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_attempts: MaxAttempts::default(),
            backoff: Backoff::default(),
            deadline: None,
            classifier: retry_all(),
            sleeper: None,
        }
    }

    /// Builder seeded from a validated [`RetryConfig`].
    pub fn from_config(cfg: &RetryConfig) -> Result<Self, String> {
        cfg.validate()?;
        Ok(Self::new()
            .max_attempts(cfg.max_attempts())
            .delay(cfg.base_delay())
            .backoff(cfg.backoff)
            .max_jitter(cfg.max_jitter())
            .max_delay(cfg.max_delay())
            .deadline(cfg.deadline()))
    }

    /// Only failures for which `retryable` returns `true` are retried.
    #[must_use]
    pub fn retry_if<F>(self, retryable: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.classifier(move |err: &E| {
            if retryable(err) {
                Verdict::Retryable
            } else {
                Verdict::Fatal
            }
        })
    }
}

impl<E> RetryPolicyBuilder<E> {
    /// Retry budget.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: MaxAttempts) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Initial delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.backoff.delay = delay;
        self
    }

    /// Growth factor per retry.
    #[must_use]
    pub fn backoff(mut self, factor: f64) -> Self {
        self.backoff.factor = factor;
        self
    }

    /// Upper bound of the random addition to each sleep.
    #[must_use]
    pub fn max_jitter(mut self, max_jitter: Duration) -> Self {
        self.backoff.max_jitter = max_jitter;
        self
    }

    /// Cap on the pre-jitter delay.
    #[must_use]
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.backoff.max_delay = max_delay;
        self
    }

    /// Deadline measured from the first attempt.
    #[must_use]
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Failure classifier.
    #[must_use]
    pub fn classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&E) -> Verdict + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Sleep used between attempts.
    #[must_use]
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleep>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Finishes the policy.
    #[must_use]
    pub fn build(self) -> RetryPolicy<E> {
        let sleeper: Arc<dyn Sleep> = match self.sleeper {
            Some(sleeper) => sleeper,
            None => Arc::new(InterruptibleSleep::default()),
        };
        RetryPolicy::from_parts(
            self.max_attempts,
            self.backoff,
            self.deadline,
            self.classifier,
            sleeper,
        )
    }
}

impl<E> std::fmt::Debug for RetryPolicyBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicyBuilder")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
