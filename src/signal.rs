//! Process signal coordination.
//!
//! A [`SignalCoordinator`] owns three flags that asynchronous signal delivery
//! raises and the normal control flow consumes:
//!
//! - **ignore terminate**: set by the first SIGTERM; later SIGTERMs are no-ops.
//!   The host's shutdown sequencer polls [`SignalCoordinator::termination_requested`].
//! - **interrupted sleep**: set by SIGCHLD; consumed by
//!   [`InterruptibleSleep`](crate::sleep::InterruptibleSleep).
//! - **reap pending**: set by SIGCHLD; consumed by
//!   [`ChildReaper`](crate::reaper::ChildReaper).
//!
//! Handlers perform atomic stores only. Repeated signals before consumption
//! coalesce into one pending action.
//!
//! # Examples
//!
//! ```
//! use prometheus_resilience::SignalCoordinator;
//!
//! let coordinator = SignalCoordinator::new();
//! assert!(coordinator.notify_terminate());
//! assert!(!coordinator.notify_terminate());
//! assert!(coordinator.termination_requested());
//! ```
//!
//! Routing real process signals to a coordinator:
//!
//! ```no_run
//! use prometheus_resilience::SignalCoordinator;
//!
//! let coordinator = SignalCoordinator::process();
//! let _guard = coordinator.install().expect("handlers");
//! // ... host main loop polls coordinator.termination_requested() ...
//! ```

use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::OnceLock;

use crate::core::SignalError;

/// Flag storage. Leaked on creation so a signal handler can never observe a
/// dangling pointer.
#[derive(Debug, Default)]
pub(crate) struct SignalFlags {
    ignore_terminate: AtomicBool,
    interrupted_sleep: AtomicBool,
    reap_pending: AtomicBool,
}

impl SignalFlags {
    fn on_terminate(&self) -> bool {
        self.ignore_terminate
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn on_child_exit(&self) {
        self.reap_pending.store(true, Ordering::SeqCst);
        self.interrupted_sleep.store(true, Ordering::SeqCst);
    }
}

/// Coordinator currently receiving process signals, or null.
static INSTALLED: AtomicPtr<SignalFlags> = AtomicPtr::new(std::ptr::null_mut());

static PROCESS: OnceLock<SignalCoordinator> = OnceLock::new();

/// Handle to a set of signal flags.
///
/// Cheap to copy; all copies observe the same flags.
#[derive(Debug, Clone, Copy)]
pub struct SignalCoordinator {
    flags: &'static SignalFlags,
}

impl Default for SignalCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalCoordinator {
    /// Creates a detached coordinator with all flags cleared.
    ///
    /// The flags live for the rest of the process.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flags: Box::leak(Box::new(SignalFlags::default())),
        }
    }

    /// The process-wide coordinator used by default sleepers and reapers.
    pub fn process() -> Self {
        *PROCESS.get_or_init(Self::new)
    }

    /// Routes SIGTERM and SIGCHLD to this coordinator.
    ///
    /// The previous dispositions are restored when the returned guard drops.
    ///
    /// # Errors
    /// - [`SignalError::AlreadyInstalled`] if another guard is alive.
    /// - [`SignalError::Os`] if `sigaction` fails.
    /// - [`SignalError::Unsupported`] on non-Unix targets.
    pub fn install(&self) -> Result<SignalGuard, SignalError> {
        let target = std::ptr::from_ref(self.flags).cast_mut();
        INSTALLED
            .compare_exchange(std::ptr::null_mut(), target, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SignalError::AlreadyInstalled)?;

        match os::install() {
            Ok(previous) => {
                tracing::debug!("signal handlers installed");
                Ok(SignalGuard { previous })
            }
            Err(err) => {
                INSTALLED.store(std::ptr::null_mut(), Ordering::SeqCst);
                Err(err)
            }
        }
    }

    /// Records a termination request.
    ///
    /// Returns `true` only for the first request; the host should start its
    /// shutdown sequence exactly then.
    pub fn notify_terminate(&self) -> bool {
        self.flags.on_terminate()
    }

    /// Records a child exit: marks a reap as pending and interrupts sleepers.
    pub fn notify_child_exit(&self) {
        self.flags.on_child_exit();
    }

    /// Whether a termination request has been received.
    pub fn termination_requested(&self) -> bool {
        self.flags.ignore_terminate.load(Ordering::SeqCst)
    }

    /// Whether a child exit is waiting to be reaped.
    pub fn reap_pending(&self) -> bool {
        self.flags.reap_pending.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_reap_pending(&self) {
        self.flags.reap_pending.store(false, Ordering::SeqCst);
    }

    pub(crate) fn sleep_interrupted(&self) -> bool {
        self.flags.interrupted_sleep.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_sleep_interrupted(&self) {
        self.flags.interrupted_sleep.store(false, Ordering::SeqCst);
    }
}

/// Keeps process signals routed to a coordinator. Restores the previous
/// handlers on drop.
#[derive(Debug)]
pub struct SignalGuard {
    previous: os::Previous,
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        os::restore(&self.previous);
        INSTALLED.store(std::ptr::null_mut(), Ordering::SeqCst);
        tracing::debug!("signal handlers restored");
    }
}

#[allow(unsafe_code)]
fn installed() -> Option<&'static SignalFlags> {
    let flags = INSTALLED.load(Ordering::SeqCst);
    // SAFETY: only pointers derived from leaked `&'static SignalFlags` are stored.
    unsafe { flags.as_ref() }
}

#[cfg(unix)]
#[allow(unsafe_code)]
mod os {
    use std::io;

    use super::{installed, SignalError};

    /// Dispositions replaced by [`install`].
    pub struct Previous {
        terminate: libc::sigaction,
        child: libc::sigaction,
    }

    impl std::fmt::Debug for Previous {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Previous").finish_non_exhaustive()
        }
    }

    extern "C" fn on_terminate(_: libc::c_int) {
        if let Some(flags) = installed() {
            flags.on_terminate();
        }
    }

    extern "C" fn on_child_exit(_: libc::c_int) {
        if let Some(flags) = installed() {
            flags.on_child_exit();
        }
    }

    fn set_action(signum: libc::c_int, handler: libc::sighandler_t) -> io::Result<libc::sigaction> {
        // SAFETY: zeroed sigaction is a valid starting value; the handlers only
        // perform atomic loads and stores.
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handler;
            action.sa_flags = 0;
            libc::sigemptyset(&raw mut action.sa_mask);
            let mut previous: libc::sigaction = std::mem::zeroed();
            if libc::sigaction(signum, &raw const action, &raw mut previous) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(previous)
        }
    }

    fn reset_action(signum: libc::c_int, action: &libc::sigaction) {
        // SAFETY: `action` was returned by a successful sigaction call.
        unsafe {
            libc::sigaction(signum, action, std::ptr::null_mut());
        }
    }

    pub fn install() -> Result<Previous, SignalError> {
        let terminate = set_action(
            libc::SIGTERM,
            on_terminate as extern "C" fn(libc::c_int) as libc::sighandler_t,
        )?;
        let child = match set_action(
            libc::SIGCHLD,
            on_child_exit as extern "C" fn(libc::c_int) as libc::sighandler_t,
        ) {
            Ok(child) => child,
            Err(err) => {
                reset_action(libc::SIGTERM, &terminate);
                return Err(err.into());
            }
        };
        Ok(Previous { terminate, child })
    }

    pub fn restore(previous: &Previous) {
        reset_action(libc::SIGCHLD, &previous.child);
        reset_action(libc::SIGTERM, &previous.terminate);
    }
}

#[cfg(not(unix))]
mod os {
    use super::SignalError;

    #[derive(Debug)]
    pub struct Previous;

    pub fn install() -> Result<Previous, SignalError> {
        Err(SignalError::Unsupported)
    }

    pub fn restore(_: &Previous) {}
}
