//! # TempTask: the task lifecycle controller.
//!
//! One [`TempTask`] manages exactly one logical unit of iterative work,
//! started at most once, with exactly one terminal outcome.
//!
//! ## Architecture
//! ```text
//! TempTask::for_each / ::transform
//!     │  (optionally registers in Registry, optionally auto-starts)
//!     ▼
//! start()
//!     ├─► worker task ──► drive(): item loop with checkpoints
//!     │        (sole writer of index/percent; sets done flag on clean exit)
//!     ├─► watchdog armer ──► waits for cancel request
//!     │        └─► Watchdog::run(): 100ms × 10 grace window, then abort
//!     └─► monitor task ──► join worker, classify outcome:
//!              ├─ Ok(Completed)         → Completed  + info event + continuation
//!              ├─ Ok(Canceled)          → Canceled   + event      + continuation
//!              ├─ Ok(Faulted(e))        → Faulted    + error event (no continuation)
//!              ├─ Err(join, cancelled)  → Aborted    + warning event + continuation
//!              └─ Err(join, panic)      → Faulted    + error event (no continuation)
//!          then: auto_delete → Registry::remove
//! ```
//!
//! ## Rules
//! - [`TempTask::start`] is at-most-once; a second call is a no-op.
//! - The monitor is the sole writer of the terminal state; the race between
//!   clean exit and forced abort is resolved by the worker's join result.
//! - The continuation fires at most once, always via the [`OwnerHandle`],
//!   never inline on a worker or watchdog task.
//! - **Fault asymmetry**: the continuation is invoked on the completed,
//!   canceled, and aborted paths, but NOT when the task faults.
//!
//! [`OwnerHandle`]: crate::OwnerHandle

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::progress::{Throttle, exact_size, resolve_total};
use crate::task::item::ItemIndex;
use crate::task::params::{Continuation, TaskContext, TaskParams};
use crate::task::state::TaskState;
use crate::task::worker::{Outcome, Shared, WorkerEnv, drive, no_action};
use crate::watchdog::{Watchdog, WatchdogPolicy};

type Work = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// Worker future plus continuation, consumed by the first `start()`.
struct Pending {
    work: Work,
    continuation: Option<Continuation>,
}

/// A managed, cancellable background task over an iteration source.
///
/// Constructed via [`TempTask::for_each`] (per-item action) or
/// [`TempTask::transform`] (bulk transform); both variants share identical
/// lifecycle semantics.
///
/// Progress reads (`current_index`, `percent`, `state`) are safe from any
/// thread and eventually consistent with the worker's last checkpoint.
pub struct TempTask {
    name: Arc<str>,
    shared: Arc<Shared>,
    state: watch::Sender<TaskState>,
    pending: Mutex<Option<Pending>>,
    watchdog: WatchdogPolicy,
    auto_delete: bool,
    ctx: TaskContext,
}

impl TempTask {
    /// Creates a task that runs `item_fn` for each element of `source`.
    ///
    /// Items advance `current_index` by one, unless the item type carries its
    /// own index (see [`ItemIndex`]). Must be called inside a tokio runtime
    /// when `params.auto_start` is set.
    pub fn for_each<I, T, F, Fut>(
        name: impl Into<String>,
        source: I,
        item_fn: F,
        params: TaskParams,
        ctx: &TaskContext,
    ) -> Arc<TempTask>
    where
        I: IntoIterator<Item = T> + Send + 'static,
        I::IntoIter: Send + 'static,
        T: ItemIndex + Send + 'static,
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let name: Arc<str> = Arc::from(name.into());
        let shared = Shared::new();
        let throttle = Throttle::new(params.notify_interval);
        let count_hint = params.count_hint;
        let delay = params.delay.clone();

        let work: Work = {
            let shared = shared.clone();
            let bus = ctx.bus.clone();
            let name = name.clone();
            Box::pin(async move {
                let items = source.into_iter();
                let total = resolve_total(exact_size(items.size_hint()), count_hint);
                let env = WorkerEnv {
                    shared: shared.clone(),
                    throttle,
                    total,
                    delay,
                    bus,
                    name,
                };
                let out = drive(items, item_fn, env).await;
                shared.mark_done();
                out
            })
        };
        Self::assemble(name, shared, work, params, ctx)
    }

    /// Creates a task that applies `transform_fn` to the whole source and
    /// drives the loop over the transformed sequence, with no per-item action.
    ///
    /// The total count for percent computation is probed from the *source*
    /// iterator before the transform runs; the carried-index rule applies to
    /// the transformed items actually iterated.
    pub fn transform<I, T, G, J>(
        name: impl Into<String>,
        source: I,
        transform_fn: G,
        params: TaskParams,
        ctx: &TaskContext,
    ) -> Arc<TempTask>
    where
        I: IntoIterator<Item = T> + Send + 'static,
        I::IntoIter: Send + 'static,
        T: Send + 'static,
        G: FnOnce(I::IntoIter) -> J + Send + 'static,
        J: IntoIterator + 'static,
        J::IntoIter: Send + 'static,
        J::Item: ItemIndex + Send + 'static,
    {
        let name: Arc<str> = Arc::from(name.into());
        let shared = Shared::new();
        let throttle = Throttle::new(params.notify_interval);
        let count_hint = params.count_hint;
        let delay = params.delay.clone();

        let work: Work = {
            let shared = shared.clone();
            let bus = ctx.bus.clone();
            let name = name.clone();
            Box::pin(async move {
                let source_iter = source.into_iter();
                let total = resolve_total(exact_size(source_iter.size_hint()), count_hint);
                let items = transform_fn(source_iter).into_iter();
                let env = WorkerEnv {
                    shared: shared.clone(),
                    throttle,
                    total,
                    delay,
                    bus,
                    name,
                };
                let out = drive(items, no_action, env).await;
                shared.mark_done();
                out
            })
        };
        Self::assemble(name, shared, work, params, ctx)
    }

    fn assemble(
        name: Arc<str>,
        shared: Arc<Shared>,
        work: Work,
        mut params: TaskParams,
        ctx: &TaskContext,
    ) -> Arc<TempTask> {
        let continuation = params.continuation.take();
        let (state, _) = watch::channel(TaskState::Created);
        let task = Arc::new(TempTask {
            name,
            shared,
            state,
            pending: Mutex::new(Some(Pending { work, continuation })),
            watchdog: params.watchdog,
            auto_delete: params.auto_delete,
            ctx: ctx.clone(),
        });
        if let Some(registry) = &task.ctx.registry {
            registry.register(task.clone());
        }
        if params.auto_start {
            task.start();
        }
        task
    }

    /// Begins asynchronous execution. At-most-once; repeat calls are no-ops.
    ///
    /// Spawns the worker, the watchdog armer, and the monitor task. Must be
    /// called inside a tokio runtime.
    pub fn start(self: &Arc<Self>) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(Pending { work, continuation }) = pending else {
            return;
        };

        self.state.send_replace(TaskState::Running);
        self.ctx
            .bus
            .publish(Event::new(EventKind::TaskStarting).with_task(self.name.clone()));

        let join = tokio::spawn(work);
        let abort = join.abort_handle();

        // Armer: one watchdog per task, armed on the first cancellation
        // request; stands down if the task reaches a terminal state first.
        {
            let shared = self.shared.clone();
            let policy = self.watchdog;
            let mut state_rx = self.state.subscribe();
            tokio::spawn(async move {
                tokio::select! {
                    _ = shared.cancel.cancelled() => {
                        let _ = Watchdog::new(policy).run(shared.done_flag(), abort).await;
                    }
                    _ = async {
                        let _ = state_rx.wait_for(|s| s.is_terminal()).await;
                    } => {}
                }
            });
        }

        let me = Arc::clone(self);
        tokio::spawn(async move { me.finish(join, continuation).await });
    }

    /// Joins the worker and publishes the single terminal outcome.
    async fn finish(self: Arc<Self>, join: JoinHandle<Outcome>, continuation: Option<Continuation>) {
        let (state, event, deliver) = match join.await {
            Ok(Outcome::Completed) => (
                TaskState::Completed,
                Event::new(EventKind::TaskCompleted)
                    .with_task(self.name.clone())
                    .with_index(self.shared.index())
                    .with_percent(self.shared.percent()),
                true,
            ),
            Ok(Outcome::Canceled) => (
                TaskState::Canceled,
                Event::new(EventKind::TaskCanceled)
                    .with_task(self.name.clone())
                    .with_index(self.shared.index()),
                true,
            ),
            Ok(Outcome::Faulted(e)) => (
                TaskState::Faulted,
                Event::new(EventKind::TaskFaulted)
                    .with_task(self.name.clone())
                    .with_reason(e.as_message())
                    .with_index(self.shared.index()),
                false,
            ),
            Err(err) if err.is_cancelled() => (
                TaskState::Aborted,
                Event::new(EventKind::TaskAborted)
                    .with_task(self.name.clone())
                    .with_reason("forced termination after grace period")
                    .with_index(self.shared.index()),
                true,
            ),
            Err(err) => (
                TaskState::Faulted,
                Event::new(EventKind::TaskFaulted)
                    .with_task(self.name.clone())
                    .with_reason(format!("worker panicked: {err}"))
                    .with_index(self.shared.index()),
                false,
            ),
        };

        self.shared.mark_done();
        self.state.send_replace(state);
        self.ctx.bus.publish(event);

        if deliver {
            if let Some(continuation) = continuation {
                let index = self.shared.index();
                self.ctx.owner.invoke(move || continuation(index));
            }
        }
        if self.auto_delete {
            if let Some(registry) = &self.ctx.registry {
                registry.remove(self.name());
            }
        }
    }

    /// Display identifier, immutable after construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last published progress index (stale up to one checkpoint interval).
    pub fn current_index(&self) -> i64 {
        self.shared.index()
    }

    /// Progress percent, 0-100; stays 0 while the total count is unknown,
    /// forced to 100 on clean completion.
    pub fn percent(&self) -> u8 {
        self.shared.percent()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    /// Requests cooperative cancellation; idempotent, any thread.
    ///
    /// Returns `true` for the first request only. The worker observes the
    /// request at its next checkpoint; if it fails to exit within the
    /// watchdog grace window its future is aborted.
    pub fn request_cancel(&self) -> bool {
        self.shared.cancel.request()
    }

    /// Suspends the worker at its next checkpoint.
    pub fn pause(&self) {
        self.shared.gate.pause();
    }

    /// Resumes a paused worker.
    pub fn resume(&self) {
        self.shared.gate.resume();
    }

    /// True if the pause gate is currently closed.
    pub fn is_paused(&self) -> bool {
        self.shared.gate.is_paused()
    }

    /// Waits until the task reaches a terminal state and returns it.
    ///
    /// A task that was never started stays `Created` forever; waiting on it
    /// is a caller error.
    pub async fn wait(&self) -> TaskState {
        let mut rx = self.state.subscribe();
        let state = match rx.wait_for(|s| s.is_terminal()).await {
            Ok(state) => *state,
            // Unreachable while `self` holds the sender; fall back to a read.
            Err(_) => self.state(),
        };
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::OwnerContext;
    use crate::events::Bus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::{self, Instant};

    fn test_ctx() -> (OwnerContext, TaskContext) {
        let (owner_ctx, owner) = OwnerContext::channel();
        (owner_ctx, TaskContext::new(Bus::new(256), owner))
    }

    fn ok_item<T>(_item: T) -> std::future::Ready<Result<(), TaskError>> {
        std::future::ready(Ok(()))
    }

    async fn recv_terminal(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Event {
        loop {
            let ev = rx.recv().await.expect("bus open");
            if ev.is_terminal() {
                return ev;
            }
        }
    }

    #[tokio::test]
    async fn test_clean_run_completes() {
        let (mut owner, ctx) = test_ctx();
        let (tx, rx) = std::sync::mpsc::channel();
        let params =
            TaskParams::default().with_continuation(move |i| tx.send(i).expect("receiver alive"));

        let task = TempTask::for_each("clean", 1..=10i32, ok_item, params, &ctx);

        assert_eq!(task.wait().await, TaskState::Completed);
        assert_eq!(task.current_index(), 10);
        assert_eq!(task.percent(), 100);
        assert_eq!(owner.run_pending(), 1);
        assert_eq!(rx.try_recv().expect("continuation ran"), 10);
    }

    #[tokio::test]
    async fn test_monotonic_index_without_carried_values() {
        let (_owner, ctx) = test_ctx();
        let task = TempTask::for_each(
            "strings",
            vec!["a"; 7],
            ok_item,
            TaskParams::default(),
            &ctx,
        );
        assert_eq!(task.wait().await, TaskState::Completed);
        assert_eq!(task.current_index(), 7);
    }

    #[tokio::test]
    async fn test_exact_source_size_beats_count_hint() {
        let (_owner, ctx) = test_ctx();
        let mut events = ctx.bus.subscribe();
        let task = TempTask::for_each(
            "sized",
            vec!["a", "b", "c", "d"],
            ok_item,
            TaskParams::default().with_count_hint(1000),
            &ctx,
        );
        assert_eq!(task.wait().await, TaskState::Completed);

        let mut percents = Vec::new();
        loop {
            let ev = events.recv().await.expect("bus open");
            if ev.kind == EventKind::TaskProgress {
                percents.push(ev.percent.expect("progress carries percent"));
            }
            if ev.is_terminal() {
                break;
            }
        }
        assert_eq!(percents, vec![25, 50, 75, 100]);
    }

    #[tokio::test]
    async fn test_percent_stays_zero_without_known_total() {
        let (_owner, ctx) = test_ctx();
        let mut events = ctx.bus.subscribe();
        let task = TempTask::for_each(
            "unsized",
            vec!["x"; 5].into_iter().filter(|_| true),
            ok_item,
            TaskParams::default(),
            &ctx,
        );
        assert_eq!(task.wait().await, TaskState::Completed);
        // Forced to 100 on clean completion only.
        assert_eq!(task.percent(), 100);
        loop {
            let ev = events.recv().await.expect("bus open");
            if ev.kind == EventKind::TaskProgress {
                assert_eq!(ev.percent, Some(0));
            }
            if ev.is_terminal() {
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_checkpoint_cadence_observes_cancel_at_multiples() {
        let (mut owner, ctx) = test_ctx();
        let processed = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = std::sync::mpsc::channel();

        let counter = processed.clone();
        let task = TempTask::for_each(
            "cadence",
            vec!["row"; 10],
            move |_r| {
                counter.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Ok(()))
            },
            TaskParams::default()
                .with_notify_interval(5)
                .with_auto_start(false)
                .with_continuation(move |i| tx.send(i).expect("receiver alive")),
            &ctx,
        );

        // Requested before item 1; the first checkpoint is index 5.
        task.request_cancel();
        task.start();

        assert_eq!(task.wait().await, TaskState::Canceled);
        assert_eq!(processed.load(Ordering::SeqCst), 5);
        // Canceled checkpoints do not publish their index.
        assert_eq!(task.current_index(), 0);
        assert_eq!(owner.run_pending(), 1);
        assert_eq!(rx.try_recv().expect("continuation ran"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mid_run_cancellation() {
        let (mut owner, ctx) = test_ctx();
        let (tx, rx) = std::sync::mpsc::channel();
        let task = TempTask::for_each(
            "slow",
            1..=1_000_000i64,
            ok_item,
            TaskParams::default()
                .with_delay(|| Duration::from_millis(50))
                .with_continuation(move |i| tx.send(i).expect("receiver alive")),
            &ctx,
        );

        time::sleep(Duration::from_millis(120)).await;
        assert!(task.request_cancel());

        assert_eq!(task.wait().await, TaskState::Canceled);
        assert!(
            task.current_index() <= 5,
            "index ran too far: {}",
            task.current_index()
        );
        assert_eq!(owner.run_pending(), 1);
        assert!(rx.try_recv().expect("continuation ran") <= 5);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_single_continuation() {
        let (mut owner, ctx) = test_ctx();
        let (tx, rx) = std::sync::mpsc::channel();
        let task = TempTask::for_each(
            "multi-cancel",
            vec!["row"; 100_000],
            ok_item,
            TaskParams::default().with_continuation(move |i| tx.send(i).expect("receiver alive")),
            &ctx,
        );

        let firsts = (0..5).filter(|_| task.request_cancel()).count();
        assert_eq!(firsts, 1);

        let state = task.wait().await;
        assert!(matches!(state, TaskState::Canceled | TaskState::Completed));
        assert_eq!(owner.run_pending(), 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "continuation must fire exactly once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_item_aborted_within_grace_window() {
        let (mut owner, ctx) = test_ctx();
        let mut events = ctx.bus.subscribe();
        let (tx, rx) = std::sync::mpsc::channel();

        let task = TempTask::for_each(
            "stuck",
            vec!["only"],
            |_r| async {
                std::future::pending::<()>().await;
                Ok(())
            },
            TaskParams::default().with_continuation(move |i| tx.send(i).expect("receiver alive")),
            &ctx,
        );

        let started = Instant::now();
        task.request_cancel();

        assert_eq!(task.wait().await, TaskState::Aborted);
        let elapsed = started.elapsed();
        assert!(
            elapsed <= Duration::from_millis(1100),
            "abort exceeded grace bound: {:?}",
            elapsed
        );

        let terminal = recv_terminal(&mut events).await;
        assert_eq!(terminal.kind, EventKind::TaskAborted);
        assert!(terminal.reason.is_some());

        // Pre-increment rule: aborted inside item 1 reports index 0.
        assert_eq!(owner.run_pending(), 1);
        assert_eq!(rx.try_recv().expect("continuation ran"), 0);
    }

    #[tokio::test]
    async fn test_fault_skips_continuation() {
        let (mut owner, ctx) = test_ctx();
        let mut events = ctx.bus.subscribe();
        let (tx, rx) = std::sync::mpsc::channel();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let task = TempTask::for_each(
            "fault",
            vec!["row"; 10],
            move |_r| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 5 {
                        Err(TaskError::fail("row 5 unreadable"))
                    } else {
                        Ok(())
                    }
                }
            },
            TaskParams::default().with_continuation(move |i| tx.send(i).expect("receiver alive")),
            &ctx,
        );

        assert_eq!(task.wait().await, TaskState::Faulted);
        assert_eq!(task.current_index(), 4);

        let terminal = recv_terminal(&mut events).await;
        assert_eq!(terminal.kind, EventKind::TaskFaulted);
        let reason = terminal.reason.expect("fault carries detail");
        assert!(reason.contains("row 5 unreadable"), "reason: {reason}");

        assert_eq!(owner.run_pending(), 0);
        assert!(rx.try_recv().is_err(), "no continuation on the fault path");
    }

    #[tokio::test]
    async fn test_panic_in_item_action_is_faulted() {
        let (mut owner, ctx) = test_ctx();
        let task = TempTask::for_each(
            "panicky",
            vec!["row"],
            |_r| async { panic!("user action exploded") },
            TaskParams::default().with_continuation(|_| {}),
            &ctx,
        );
        assert_eq!(task.wait().await, TaskState::Faulted);
        assert_eq!(owner.run_pending(), 0);
    }

    #[tokio::test]
    async fn test_item_action_canceled_error_is_graceful() {
        let (mut owner, ctx) = test_ctx();
        let task = TempTask::for_each(
            "self-cancel",
            vec!["row"; 10],
            |_r| async { Err(TaskError::Canceled) },
            TaskParams::default().with_continuation(|_| {}),
            &ctx,
        );
        assert_eq!(task.wait().await, TaskState::Canceled);
        assert_eq!(owner.run_pending(), 1);
    }

    #[tokio::test]
    async fn test_transform_iterates_transformed_sequence() {
        let (_owner, ctx) = test_ctx();
        let task = TempTask::transform(
            "truncate",
            vec!["a", "b", "c", "d", "e", "f"],
            |items| items.take(3),
            TaskParams::default(),
            &ctx,
        );
        assert_eq!(task.wait().await, TaskState::Completed);
        assert_eq!(task.current_index(), 3);
        assert_eq!(task.percent(), 100);
    }

    #[tokio::test]
    async fn test_transform_items_carry_index() {
        let (_owner, ctx) = test_ctx();
        let task = TempTask::transform(
            "scale",
            1..=4i32,
            |items| items.map(|n| n * 10),
            TaskParams::default(),
            &ctx,
        );
        assert_eq!(task.wait().await, TaskState::Completed);
        assert_eq!(task.current_index(), 40);
    }

    #[tokio::test]
    async fn test_start_twice_is_noop() {
        let (mut owner, ctx) = test_ctx();
        let task = TempTask::for_each(
            "once",
            vec!["row"; 3],
            ok_item,
            TaskParams::default()
                .with_auto_start(false)
                .with_continuation(|_| {}),
            &ctx,
        );
        assert_eq!(task.state(), TaskState::Created);
        task.start();
        task.start();
        assert_eq!(task.wait().await, TaskState::Completed);
        assert_eq!(owner.run_pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_gate_suspends_between_items() {
        let (_owner, ctx) = test_ctx();
        let task = TempTask::for_each(
            "pausable",
            vec!["row"; 3],
            ok_item,
            TaskParams::default().with_auto_start(false),
            &ctx,
        );

        task.pause();
        task.start();
        time::sleep(Duration::from_millis(50)).await;

        // First checkpoint published its index, then parked at the gate.
        assert_eq!(task.state(), TaskState::Running);
        assert_eq!(task.current_index(), 1);

        task.resume();
        assert_eq!(task.wait().await, TaskState::Completed);
        assert_eq!(task.current_index(), 3);
    }
}
