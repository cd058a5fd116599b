//! # Task construction parameters and collaborator context.
//!
//! [`TaskParams`] bundles the per-task knobs (checkpoint cadence, count hint,
//! autostart/auto-delete, optional delay function, watchdog policy,
//! continuation). [`TaskContext`] bundles the external collaborators every
//! task needs: the event bus, the owning-context handle, and an optional
//! registry.
//!
//! Both are plain structs with `with_*` combinators; defaults mirror the
//! common case (every item a checkpoint, autostart, auto-delete on).

use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::OwnerHandle;
use crate::events::Bus;
use crate::registry::Registry;
use crate::watchdog::WatchdogPolicy;

/// Completion callback, invoked exactly once with the final `current_index`,
/// always on the owning context.
pub type Continuation = Box<dyn FnOnce(i64) + Send + 'static>;

/// Per-checkpoint delay source; the worker sleeps for the returned duration.
/// Used for deterministic throttling in tests or rate limiting.
pub type DelayFn = Arc<dyn Fn() -> Duration + Send + Sync + 'static>;

/// Construction parameters for a [`TempTask`](crate::TempTask).
///
/// # Example
/// ```
/// use temptask::TaskParams;
///
/// let params = TaskParams::default()
///     .with_notify_interval(10)
///     .with_count_hint(5_000)
///     .with_auto_start(false)
///     .with_continuation(|final_index| println!("done at {final_index}"));
/// assert!(!params.auto_start);
/// ```
pub struct TaskParams {
    /// Raw checkpoint cadence; values `<= 0` are normalized to 1.
    pub notify_interval: i64,
    /// Total-count hint when the source size is unknown; `None` or `<= 0`
    /// suppresses percent computation until completion.
    pub count_hint: Option<i64>,
    /// Start the worker from the factory.
    pub auto_start: bool,
    /// Remove the task from the registry on any terminal state.
    pub auto_delete: bool,
    /// Optional per-checkpoint delay source.
    pub delay: Option<DelayFn>,
    /// Grace-window parameters for forced termination.
    pub watchdog: WatchdogPolicy,
    /// Completion callback (success, cancel, and forced-abort paths).
    pub continuation: Option<Continuation>,
}

impl Default for TaskParams {
    fn default() -> Self {
        Self {
            notify_interval: 1,
            count_hint: None,
            auto_start: true,
            auto_delete: true,
            delay: None,
            watchdog: WatchdogPolicy::default(),
            continuation: None,
        }
    }
}

impl TaskParams {
    /// Sets the checkpoint cadence (every Nth processed item).
    pub fn with_notify_interval(mut self, interval: i64) -> Self {
        self.notify_interval = interval;
        self
    }

    /// Sets the total-count hint used when the source size is unknown.
    pub fn with_count_hint(mut self, count: i64) -> Self {
        self.count_hint = Some(count);
        self
    }

    /// Controls whether the factory starts the worker immediately.
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Controls registry self-removal on terminal states.
    pub fn with_auto_delete(mut self, auto_delete: bool) -> Self {
        self.auto_delete = auto_delete;
        self
    }

    /// Sets a per-checkpoint delay source.
    pub fn with_delay(mut self, delay: impl Fn() -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Arc::new(delay));
        self
    }

    /// Overrides the watchdog grace-window policy.
    pub fn with_watchdog(mut self, watchdog: WatchdogPolicy) -> Self {
        self.watchdog = watchdog;
        self
    }

    /// Registers the completion callback.
    pub fn with_continuation(mut self, f: impl FnOnce(i64) + Send + 'static) -> Self {
        self.continuation = Some(Box::new(f));
        self
    }
}

/// External collaborators shared by tasks; borrowed seams, not owned here.
#[derive(Clone)]
pub struct TaskContext {
    /// Event bus for lifecycle/progress events.
    pub bus: Bus,
    /// Owning-context handle for continuation dispatch.
    pub owner: OwnerHandle,
    /// Optional roster; tasks register at creation and may self-remove.
    pub registry: Option<Arc<Registry>>,
}

impl TaskContext {
    /// Creates a context without a registry.
    pub fn new(bus: Bus, owner: OwnerHandle) -> Self {
        Self {
            bus,
            owner,
            registry: None,
        }
    }

    /// Attaches a registry; tasks created with this context register there.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }
}
