//! Best-effort collection of exited child processes.

use parking_lot::Mutex;

use crate::signal::SignalCoordinator;

/// Drains terminated children after a child-exit notification.
///
/// Call [`ChildReaper::reap`] from the host's main loop. It does nothing
/// unless the coordinator has a reap pending.
#[derive(Debug)]
pub struct ChildReaper {
    coordinator: SignalCoordinator,
    busy: Mutex<()>,
}

impl Default for ChildReaper {
    fn default() -> Self {
        Self::new(SignalCoordinator::process())
    }
}

impl ChildReaper {
    /// Creates a reaper consuming `coordinator`'s pending-reap flag.
    #[must_use]
    pub fn new(coordinator: SignalCoordinator) -> Self {
        Self {
            coordinator,
            busy: Mutex::new(()),
        }
    }

    /// Collects every child that has already exited, without blocking.
    ///
    /// Stops when no exited child remains or the OS reports an error (for
    /// example, no children at all). Errors are logged and swallowed. The
    /// pending flag is cleared on every path. Returns the number of children
    /// collected; a concurrent call that finds the reaper busy returns 0.
    pub fn reap(&self) -> usize {
        if !self.coordinator.reap_pending() {
            return 0;
        }
        let Some(_busy) = self.busy.try_lock() else {
            return 0;
        };

        let reaped = drain();
        self.coordinator.clear_reap_pending();
        if reaped > 0 {
            tracing::debug!(reaped, "reaped child processes");
        }
        reaped
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn drain() -> usize {
    let mut reaped = 0;
    loop {
        let mut status: libc::c_int = 0;
        // SAFETY: `status` is a valid out-pointer; WNOHANG never blocks.
        let pid = unsafe { libc::waitpid(-1, &raw mut status, libc::WNOHANG) };
        match pid {
            0 => break,
            p if p < 0 => {
                let err = std::io::Error::last_os_error();
                tracing::debug!(error = %err, "waitpid stopped reaping");
                break;
            }
            _ => reaped += 1,
        }
    }
    reaped
}

#[cfg(not(unix))]
const fn drain() -> usize {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reap_noop_without_pending() {
        let reaper = ChildReaper::new(SignalCoordinator::new());
        assert_eq!(reaper.reap(), 0);
    }

    #[test]
    fn test_reap_clears_pending_on_error_path() {
        let coordinator = SignalCoordinator::new();
        coordinator.notify_child_exit();
        let reaper = ChildReaper::new(coordinator);

        // The unit-test process has no exited children of its own to collect,
        // so waitpid reports 0 or ECHILD; either way the flag must be cleared.
        reaper.reap();
        assert!(!coordinator.reap_pending());
    }

    #[test]
    fn test_reap_skips_when_busy() {
        let coordinator = SignalCoordinator::new();
        coordinator.notify_child_exit();
        let reaper = ChildReaper::new(coordinator);

        let held = reaper.busy.lock();
        assert_eq!(reaper.reap(), 0);
        assert!(coordinator.reap_pending());
        drop(held);
    }
}
