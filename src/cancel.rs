//! # Cancellation coordinator.
//!
//! [`CancelCell`] holds the cooperative-cancel state for one task:
//! a once-only request flag plus a [`CancellationToken`] that the watchdog
//! armer awaits.
//!
//! ## Rules
//! - [`CancelCell::request`] is idempotent and callable from any thread; only
//!   the first caller observes `true`.
//! - [`CancelCell::is_requested`] is a non-blocking poll used by the worker at
//!   its checkpoints.
//! - The cell never interacts with the worker directly; observation is always
//!   cooperative.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Shared cooperative-cancellation state for a single task.
#[derive(Debug, Default)]
pub struct CancelCell {
    requested: AtomicBool,
    token: CancellationToken,
}

impl CancelCell {
    /// Creates a cell with no cancellation requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Returns `true` for the first caller only; later calls are no-ops.
    pub fn request(&self) -> bool {
        let first = self
            .requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if first {
            self.token.cancel();
        }
        first
    }

    /// Non-blocking poll: has cancellation been requested?
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Completes once cancellation has been requested.
    ///
    /// Used by the watchdog armer; completes immediately if cancellation was
    /// requested before the call.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}
