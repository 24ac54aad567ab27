//! # Prometheus Resilience
//!
//! Resilient-call primitives for host processes that drive unreliable external
//! dependencies (a consensus store, a database) and supervise child processes.
//!
//! ## Key Features
//!
//! - **Retry executor**: [`RetryPolicy`] re-runs an operation with exponential
//!   backoff, jitter, an attempt budget, and an absolute deadline
//! - **Failure classification**: an injected classifier decides per failure
//!   whether to retry or hand the error back unchanged
//! - **Signal coordination**: [`SignalCoordinator`] turns SIGTERM/SIGCHLD into
//!   atomic flags consumed on the normal control flow
//! - **Interruptible sleep**: [`InterruptibleSleep`] resumes after child-exit
//!   wake-ups so waits are never shortened
//! - **Child reaping**: [`ChildReaper`] drains exited children without blocking
//! - **Lease TTLs**: [`lease::parse_timestamp`] and [`lease::calculate_ttl`]
//!
//! ## Retrying a call
//!
//! ```rust
//! use std::time::Duration;
//! use prometheus_resilience::{MaxAttempts, RetryPolicy, Verdict};
//!
//! #[derive(Debug)]
//! enum StoreError {
//!     Unavailable,
//!     Corrupt,
//! }
//!
//! let mut policy = RetryPolicy::builder()
//!     .max_attempts(MaxAttempts::Bounded(5))
//!     .delay(Duration::from_millis(1))
//!     .max_jitter(Duration::ZERO)
//!     .deadline(Some(Duration::from_secs(2)))
//!     .classifier(|e: &StoreError| match e {
//!         StoreError::Unavailable => Verdict::Retryable,
//!         StoreError::Corrupt => Verdict::Fatal,
//!     })
//!     .build();
//!
//! let mut calls = 0;
//! let value = policy.execute(|| {
//!     calls += 1;
//!     if calls < 3 { Err(StoreError::Unavailable) } else { Ok("leader") }
//! });
//! assert_eq!(value.unwrap(), "leader");
//! ```
//!
//! ## Host main loop
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use prometheus_resilience::{ChildReaper, InterruptibleSleep, SignalCoordinator};
//!
//! prometheus_resilience::util::init_tracing();
//! let coordinator = SignalCoordinator::process();
//! let _guard = coordinator.install().expect("signal handlers");
//! let sleep = InterruptibleSleep::new(coordinator);
//! let reaper = ChildReaper::new(coordinator);
//!
//! while !coordinator.termination_requested() {
//!     reaper.reap();
//!     // ... one cycle of host work ...
//!     sleep.wait_for(Duration::from_secs(10));
//! }
//! ```

/// Retry execution: backoff schedule, policy, and error types.
pub mod core;
/// Configuration models for retry policies.
pub mod config;
/// Builders to construct retry policies from code or configuration.
pub mod builders;
/// Lease expiration timestamps and time-to-live.
pub mod lease;
/// Best-effort collection of exited child processes.
pub mod reaper;
/// Process signal coordination.
pub mod signal;
/// Sleep primitives.
pub mod sleep;
/// Shared utilities.
pub mod util;

pub use crate::builders::RetryPolicyBuilder;
pub use crate::config::RetryConfig;
pub use crate::core::{Backoff, MaxAttempts, RetryError, RetryPolicy, SignalError, Verdict};
pub use crate::reaper::ChildReaper;
pub use crate::signal::{SignalCoordinator, SignalGuard};
pub use crate::sleep::{InterruptibleSleep, NativeSleep, Sleep};
