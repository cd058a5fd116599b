//! # Runtime events emitted by tasks and the registry.
//!
//! [`EventKind`] classifies events across three categories:
//! - **Lifecycle events**: task flow (starting, throttled progress, terminal states)
//! - **Registry events**: roster changes (registered, rejected, removed)
//!
//! The [`Event`] struct carries optional metadata such as the task name, a
//! human-readable reason, and the progress snapshot at publish time.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore exact order when events are observed
//! out of order.
//!
//! ## Example
//! ```rust
//! use temptask::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFaulted)
//!     .with_task("import")
//!     .with_reason("boom")
//!     .with_index(42);
//!
//! assert_eq!(ev.kind, EventKind::TaskFaulted);
//! assert_eq!(ev.task.as_deref(), Some("import"));
//! assert_eq!(ev.index, Some(42));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle events ===
    /// Worker execution has begun.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskStarting,

    /// Throttled progress snapshot, published once per checkpoint.
    ///
    /// Sets: `task`, `index`, `percent`, `at`, `seq`.
    TaskProgress,

    /// Task ran to natural completion (informational).
    ///
    /// Sets: `task`, `index`, `percent` (always 100), `at`, `seq`.
    TaskCompleted,

    /// Worker observed cancellation at a checkpoint and exited cleanly.
    ///
    /// Sets: `task`, `index` (last published checkpoint), `at`, `seq`.
    TaskCanceled,

    /// Grace window elapsed; the worker was forcibly terminated (warning).
    ///
    /// Sets: `task`, `index` (best-effort last index), `reason`, `at`, `seq`.
    TaskAborted,

    /// Unexpected fault from a user-supplied action (error with detail).
    ///
    /// Sets: `task`, `reason` (error detail), `index`, `at`, `seq`.
    TaskFaulted,

    // === Registry events ===
    /// Task was added to the roster.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskRegistered,

    /// Registration refused (duplicate name).
    ///
    /// Sets: `task`, `reason`, `at`, `seq`.
    TaskRejected,

    /// Task was removed from the roster.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskRemoved,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, rejection details, etc.).
    pub reason: Option<Arc<str>>,
    /// Progress index snapshot.
    pub index: Option<i64>,
    /// Percent snapshot (0-100).
    pub percent: Option<u8>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            index: None,
            percent: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a progress index snapshot.
    #[inline]
    pub fn with_index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches a percent snapshot.
    #[inline]
    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = Some(percent);
        self
    }

    /// True for the terminal lifecycle kinds.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskCompleted
                | EventKind::TaskCanceled
                | EventKind::TaskAborted
                | EventKind::TaskFaulted
        )
    }
}
