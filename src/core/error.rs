//! Error types for resilient-call operations.

use std::time::Duration;

use thiserror::Error;

/// Terminal outcome of a failed [`RetryPolicy::execute`](crate::core::RetryPolicy::execute).
///
/// `Exhausted` and `DeadlineExceeded` discard the failure that triggered them;
/// only `Fatal` carries the operation's own error, untouched.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The classifier marked the failure as non-retryable.
    #[error("{0}")]
    Fatal(E),
    /// Attempt budget spent.
    #[error("too many retry attempts ({attempts})")]
    Exhausted {
        /// Retries performed before giving up.
        attempts: u32,
    },
    /// The next sleep would cross the absolute deadline.
    #[error("exceeded retry deadline ({deadline:?})")]
    DeadlineExceeded {
        /// The configured deadline.
        deadline: Duration,
    },
}

impl<E> RetryError<E> {
    /// Returns a short stable label (snake_case) for use in logs.
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Fatal(_) => "retry_fatal",
            Self::Exhausted { .. } => "retry_exhausted",
            Self::DeadlineExceeded { .. } => "retry_deadline_exceeded",
        }
    }

    /// `true` when the operation's own error was propagated.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Unwraps the operation's error, if this is a fatal failure.
    pub fn into_fatal(self) -> Option<E> {
        match self {
            Self::Fatal(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors produced while installing process signal handlers.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Another coordinator already owns the process handlers.
    #[error("signal handlers already installed")]
    AlreadyInstalled,
    /// The platform has no SIGTERM/SIGCHLD.
    #[error("signal handling unsupported on this platform")]
    Unsupported,
    /// `sigaction` failed.
    #[error("os error: {0}")]
    Os(#[from] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
