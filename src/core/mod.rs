//! Retry execution: backoff schedule, policy, and error types.

pub mod backoff;
pub mod error;
pub mod retry;

pub use backoff::Backoff;
pub use error::{AppResult, RetryError, SignalError};
pub use retry::{retry_all, Classifier, MaxAttempts, RetryPolicy, Verdict};
