//! Sleep primitives.
//!
//! - [`Sleep`] the seam [`RetryPolicy`](crate::core::RetryPolicy) sleeps through;
//! - [`NativeSleep`] one OS-level sleep that a signal may cut short;
//! - [`InterruptibleSleep`] resumes after child-exit wake-ups so the total
//!   wait is never shorter than requested.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::signal::SignalCoordinator;

/// Blocking sleep used between retry attempts.
pub trait Sleep: Send + Sync {
    /// Blocks the calling thread for (about) `duration`.
    fn sleep(&self, duration: Duration);
}

/// A single OS sleep.
///
/// On Unix this is one `nanosleep` call, so a delivered signal ends it early.
/// Elsewhere it is [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSleep;

impl Sleep for NativeSleep {
    #[cfg(unix)]
    #[allow(unsafe_code)]
    fn sleep(&self, duration: Duration) {
        let request = libc::timespec {
            tv_sec: libc::time_t::try_from(duration.as_secs()).unwrap_or(libc::time_t::MAX),
            tv_nsec: libc::c_long::try_from(duration.subsec_nanos()).unwrap_or(0),
        };
        // SAFETY: `request` is a valid timespec; the remainder pointer may be null.
        unsafe {
            libc::nanosleep(&raw const request, std::ptr::null_mut());
        }
    }

    #[cfg(not(unix))]
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Sleep that tolerates child-exit interruptions without shortening the wait.
///
/// Before every inner sleep the coordinator's interrupted flag is cleared. If
/// the flag is still clear on wake-up the wait is over; otherwise the remaining
/// time is recomputed from the instant the wait started and the sleep resumes.
/// The flag is cleared again on exit.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use prometheus_resilience::{InterruptibleSleep, SignalCoordinator};
///
/// let sleep = InterruptibleSleep::new(SignalCoordinator::new());
/// let started = Instant::now();
/// sleep.wait_for(Duration::from_millis(20));
/// assert!(started.elapsed() >= Duration::from_millis(20));
/// ```
#[derive(Clone)]
pub struct InterruptibleSleep {
    coordinator: SignalCoordinator,
    inner: Arc<dyn Sleep>,
}

impl std::fmt::Debug for InterruptibleSleep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptibleSleep")
            .field("coordinator", &self.coordinator)
            .field("inner", &"<sleep>")
            .finish()
    }
}

impl Default for InterruptibleSleep {
    /// Sleeps natively, watching the process coordinator.
    fn default() -> Self {
        Self::new(SignalCoordinator::process())
    }
}

impl InterruptibleSleep {
    /// Creates a sleeper watching `coordinator`, backed by [`NativeSleep`].
    #[must_use]
    pub fn new(coordinator: SignalCoordinator) -> Self {
        Self::with_inner(coordinator, Arc::new(NativeSleep))
    }

    /// Creates a sleeper over a custom single-shot sleep.
    #[must_use]
    pub fn with_inner(coordinator: SignalCoordinator, inner: Arc<dyn Sleep>) -> Self {
        Self { coordinator, inner }
    }

    /// Blocks until at least `duration` has elapsed.
    pub fn wait_for(&self, duration: Duration) {
        let started = Instant::now();
        let mut elapsed = Duration::ZERO;
        while elapsed < duration {
            self.coordinator.clear_sleep_interrupted();
            self.inner.sleep(duration - elapsed);
            if !self.coordinator.sleep_interrupted() {
                break;
            }
            elapsed = started.elapsed();
        }
        self.coordinator.clear_sleep_interrupted();
    }
}

impl Sleep for InterruptibleSleep {
    fn sleep(&self, duration: Duration) {
        self.wait_for(duration);
    }
}
