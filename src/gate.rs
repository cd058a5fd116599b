//! # Pause/resume gate for running workers.
//!
//! [`PauseGate`] lets an external controller suspend a task between items.
//! The worker blocks in [`PauseGate::wait_if_paused`] at every checkpoint, so
//! pause granularity equals the cancellation-check cadence: a paused worker
//! stops at its next checkpoint, not mid-item.

use tokio::sync::watch;

/// Externally controlled suspension point, observed once per checkpoint.
#[derive(Debug)]
pub struct PauseGate {
    paused: watch::Sender<bool>,
}

impl PauseGate {
    /// Creates an open (not paused) gate.
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self { paused }
    }

    /// Suspends the worker at its next checkpoint. Idempotent.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Resumes a paused worker. Idempotent.
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Returns true if the gate is currently closed.
    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Returns once the gate is open; immediate if not paused.
    pub async fn wait_if_paused(&self) {
        let mut rx = self.paused.subscribe();
        // The sender lives in self, so wait_for cannot observe a closed channel.
        let _ = rx.wait_for(|paused| !*paused).await;
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_pause_resume_flags() {
        let gate = PauseGate::new();
        assert!(!gate.is_paused());
        gate.pause();
        gate.pause();
        assert!(gate.is_paused());
        gate.resume();
        assert!(!gate.is_paused());
    }

    #[tokio::test]
    async fn test_open_gate_does_not_block() {
        let gate = PauseGate::new();
        gate.wait_if_paused().await;
    }

    #[tokio::test]
    async fn test_waiter_released_on_resume() {
        let gate = Arc::new(PauseGate::new());
        gate.pause();

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait_if_paused().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        gate.resume();
        waiter.await.expect("waiter should be released");
    }
}
