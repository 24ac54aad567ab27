//! Retry policy configuration.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, MaxAttempts};

/// Serializable description of a retry policy.
///
/// Durations are expressed in (fractional) seconds. `max_tries = -1` means
/// unlimited retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first call; `-1` for unlimited.
    pub max_tries: i64,
    /// Initial delay between attempts.
    pub delay_secs: f64,
    /// Multiplier applied to the delay after each retry.
    pub backoff: f64,
    /// Upper bound of the random delay addition.
    pub max_jitter_secs: f64,
    /// Cap on the pre-jitter delay.
    pub max_delay_secs: f64,
    /// Optional deadline measured from the first attempt.
    pub deadline_secs: Option<f64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_tries: 1,
            delay_secs: 0.1,
            backoff: 2.0,
            max_jitter_secs: 0.8,
            max_delay_secs: 3600.0,
            deadline_secs: None,
        }
    }
}

fn check_secs(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{name} must be a finite, non-negative number"));
    }
    if Duration::try_from_secs_f64(value).is_err() {
        return Err(format!("{name} is out of range"));
    }
    Ok(())
}

impl RetryConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if MaxAttempts::from_tries(self.max_tries).is_none() {
            return Err("max_tries must be -1 (unlimited) or a non-negative count".into());
        }
        if !self.backoff.is_finite() || self.backoff < 0.0 {
            return Err("backoff must be a finite, non-negative number".into());
        }
        check_secs("delay_secs", self.delay_secs)?;
        check_secs("max_jitter_secs", self.max_jitter_secs)?;
        check_secs("max_delay_secs", self.max_delay_secs)?;
        if let Some(deadline) = self.deadline_secs {
            check_secs("deadline_secs", deadline)?;
        }
        Ok(())
    }

    /// Parse retry configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `RETRY_*` environment variables.
    ///
    /// A `.env` file in the working directory is read first, if present.
    /// Unset variables keep their defaults.
    ///
    /// | variable                | field             |
    /// |-------------------------|-------------------|
    /// | `RETRY_MAX_TRIES`       | `max_tries`       |
    /// | `RETRY_DELAY_SECS`      | `delay_secs`      |
    /// | `RETRY_BACKOFF`         | `backoff`         |
    /// | `RETRY_MAX_JITTER_SECS` | `max_jitter_secs` |
    /// | `RETRY_MAX_DELAY_SECS`  | `max_delay_secs`  |
    /// | `RETRY_DEADLINE_SECS`   | `deadline_secs`   |
    ///
    /// # Errors
    /// Fails if a variable does not parse or the result does not validate.
    pub fn from_env() -> AppResult<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("failed to read .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Fails if a present value does not parse or the result does not validate.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> AppResult<Option<T>>
        where
            T: std::str::FromStr,
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            lookup(key)
                .map(|raw| raw.trim().parse::<T>().with_context(|| format!("invalid {key}: {raw:?}")))
                .transpose()
        }

        let mut cfg = Self::default();
        if let Some(v) = parse(&lookup, "RETRY_MAX_TRIES")? {
            cfg.max_tries = v;
        }
        if let Some(v) = parse(&lookup, "RETRY_DELAY_SECS")? {
            cfg.delay_secs = v;
        }
        if let Some(v) = parse(&lookup, "RETRY_BACKOFF")? {
            cfg.backoff = v;
        }
        if let Some(v) = parse(&lookup, "RETRY_MAX_JITTER_SECS")? {
            cfg.max_jitter_secs = v;
        }
        if let Some(v) = parse(&lookup, "RETRY_MAX_DELAY_SECS")? {
            cfg.max_delay_secs = v;
        }
        if let Some(v) = parse(&lookup, "RETRY_DEADLINE_SECS")? {
            cfg.deadline_secs = Some(v);
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Retry budget. Invalid counts fall back to the default of one retry.
    #[must_use]
    pub fn max_attempts(&self) -> MaxAttempts {
        MaxAttempts::from_tries(self.max_tries).unwrap_or_default()
    }

    /// Initial delay.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        secs(self.delay_secs)
    }

    /// Jitter upper bound.
    #[must_use]
    pub fn max_jitter(&self) -> Duration {
        secs(self.max_jitter_secs)
    }

    /// Delay cap.
    #[must_use]
    pub fn max_delay(&self) -> Duration {
        secs(self.max_delay_secs)
    }

    /// Deadline, if configured.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(secs)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
