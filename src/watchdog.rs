//! # Abort watchdog: bounded escalation from cooperative cancel to forced termination.
//!
//! Cooperative cancellation depends on the worker reaching a checkpoint. If the
//! worker is stuck inside a single long-running item (or ignores checkpoints),
//! the watchdog guarantees termination within a bounded window instead of
//! hanging forever.
//!
//! ## State machine
//! ```text
//! Armed ──► Satisfied   (worker set its done flag within the grace window)
//!       └─► Fired       (window elapsed; worker future aborted)
//! ```
//! Terminal either way; a watchdog is never re-armed for the same task.
//!
//! ## Forced termination
//! Firing calls [`AbortHandle::abort`], which drops the worker future at its
//! next await point. Unlike a hard thread kill this cannot corrupt shared
//! state, but it also cannot preempt a worker stuck inside a *synchronous*
//! call; every checkpoint therefore ends in an await so cooperative loops
//! always carry abort points.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time;

/// Grace-window parameters for the abort watchdog.
///
/// The worker gets `poll × polls` (default 100ms × 10 = 1s) to observe
/// cancellation and exit cleanly before its future is aborted.
#[derive(Clone, Copy, Debug)]
pub struct WatchdogPolicy {
    /// Sleep between done-flag polls.
    pub poll: Duration,
    /// Number of polls before firing.
    pub polls: u32,
}

impl Default for WatchdogPolicy {
    /// 100ms polling, 10 polls, a one second grace window.
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(100),
            polls: 10,
        }
    }
}

impl WatchdogPolicy {
    /// Total grace window (`poll × polls`).
    pub fn grace(&self) -> Duration {
        self.poll * self.polls
    }
}

/// Terminal outcome of one armed watchdog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchdogOutcome {
    /// The worker exited cleanly within the grace window; nothing was done.
    Satisfied,
    /// The window elapsed; the worker future was aborted.
    Fired,
}

/// Watches one worker after cancellation has been requested.
pub struct Watchdog {
    policy: WatchdogPolicy,
}

impl Watchdog {
    /// Creates a watchdog with the given policy.
    pub fn new(policy: WatchdogPolicy) -> Self {
        Self { policy }
    }

    /// Polls `done` in bounded increments; aborts the worker if the window
    /// elapses without the flag being set.
    ///
    /// The final check before firing closes the race where the worker finishes
    /// during the last sleep. Aborting an already-finished task is a no-op, so
    /// the watchdog can never override a terminal state that was already
    /// reached.
    pub async fn run(&self, done: &AtomicBool, abort: AbortHandle) -> WatchdogOutcome {
        for _ in 0..self.policy.polls {
            time::sleep(self.policy.poll).await;
            if done.load(Ordering::Acquire) {
                return WatchdogOutcome::Satisfied;
            }
        }
        if done.load(Ordering::Acquire) {
            return WatchdogOutcome::Satisfied;
        }
        abort.abort();
        WatchdogOutcome::Fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fast_policy() -> WatchdogPolicy {
        WatchdogPolicy {
            poll: Duration::from_millis(100),
            polls: 10,
        }
    }

    #[test]
    fn test_grace_is_poll_times_polls() {
        assert_eq!(fast_policy().grace(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_satisfied_when_worker_finishes_in_window() {
        let done = Arc::new(AtomicBool::new(false));
        let worker = tokio::spawn(async { std::future::pending::<()>().await });
        let abort = worker.abort_handle();

        let setter = {
            let done = done.clone();
            tokio::spawn(async move {
                time::sleep(Duration::from_millis(350)).await;
                done.store(true, Ordering::Release);
            })
        };

        let outcome = Watchdog::new(fast_policy()).run(&done, abort).await;
        assert_eq!(outcome, WatchdogOutcome::Satisfied);
        setter.await.expect("setter finished");
        assert!(!worker.is_finished(), "satisfied watchdog must not abort");
        worker.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_within_bounded_window() {
        let done = Arc::new(AtomicBool::new(false));
        let worker = tokio::spawn(async { std::future::pending::<()>().await });
        let abort = worker.abort_handle();

        let started = time::Instant::now();
        let outcome = Watchdog::new(fast_policy()).run(&done, abort).await;
        let elapsed = started.elapsed();

        assert_eq!(outcome, WatchdogOutcome::Fired);
        assert!(
            elapsed >= Duration::from_secs(1) && elapsed <= Duration::from_millis(1100),
            "grace window bound violated: {:?}",
            elapsed
        );
        let err = worker.await.expect_err("worker must be aborted");
        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_check_beats_last_sleep_race() {
        let done = Arc::new(AtomicBool::new(false));
        let worker = tokio::spawn(async { std::future::pending::<()>().await });
        let abort = worker.abort_handle();

        // Flag flips just before the window closes.
        let setter = {
            let done = done.clone();
            tokio::spawn(async move {
                time::sleep(Duration::from_millis(999)).await;
                done.store(true, Ordering::Release);
            })
        };

        let outcome = Watchdog::new(fast_policy()).run(&done, abort).await;
        assert_eq!(outcome, WatchdogOutcome::Satisfied);
        setter.await.expect("setter finished");
        worker.abort();
    }
}
