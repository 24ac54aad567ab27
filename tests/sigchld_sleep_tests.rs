//! Integration test for sleeping through a real SIGCHLD
//!
//! Installs process handlers, so this file holds a single scenario.

#![cfg(unix)]

use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use prometheus_resilience::{ChildReaper, InterruptibleSleep, SignalCoordinator};

#[test]
fn test_child_exit_does_not_shorten_wait() {
    let coordinator = SignalCoordinator::new();
    let _guard = coordinator.install().expect("install handlers");

    let waiter = thread::spawn(move || {
        let started = Instant::now();
        InterruptibleSleep::new(coordinator).wait_for(Duration::from_millis(150));
        started.elapsed()
    });

    thread::sleep(Duration::from_millis(30));
    let _child = Command::new("true").spawn().expect("spawn child");

    let elapsed = waiter.join().unwrap();
    assert!(elapsed >= Duration::from_millis(150), "elapsed {elapsed:?}");

    let started = Instant::now();
    while !coordinator.reap_pending() && started.elapsed() < Duration::from_secs(5) {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(coordinator.reap_pending(), "no SIGCHLD observed");

    let reaper = ChildReaper::new(coordinator);
    let mut reaped = 0;
    while reaped == 0 && started.elapsed() < Duration::from_secs(5) {
        reaped += reaper.reap();
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(reaped, 1);
}
