//! # The iteration loop driver.
//!
//! Both task variants (per-item action and bulk transform) feed [`drive`],
//! which performs the per-item protocol in a fixed order:
//!
//! ```text
//! for each item:
//!   ├─► capture the item's carried index (ItemIndex)
//!   ├─► run the per-item action           ─► Err(Canceled) → Outcome::Canceled
//!   │                                     ─► Err(other)    → Outcome::Faulted
//!   ├─► advance index (carried value, else +1)
//!   ├─► not a checkpoint? → next item, no further checks
//!   ├─► cancellation requested? → Outcome::Canceled
//!   │     (the index for this checkpoint is NOT published)
//!   ├─► optional delay sleep
//!   ├─► recompute percent (known total only)
//!   ├─► publish index + TaskProgress event
//!   ├─► pause gate (may suspend until resumed)
//!   └─► yield (abort point for the watchdog)
//! ```
//!
//! On natural completion: final index published, percent forced to 100,
//! `Outcome::Completed`.
//!
//! ## Rules
//! - Progress fields are written by the worker only; readers tolerate
//!   staleness up to one checkpoint interval.
//! - Every checkpoint ends in an await, so a cooperative loop always offers
//!   the watchdog an abort point.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU8, Ordering};

use tokio::time;

use crate::cancel::CancelCell;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::gate::PauseGate;
use crate::progress::{Throttle, percent_of};
use crate::task::item::ItemIndex;
use crate::task::params::DelayFn;

/// Shared progress/cancellation state for one task.
///
/// Single-writer discipline: the worker writes `index`/`percent`/`done`;
/// everyone else only reads. The cancel cell and pause gate carry their own
/// synchronization.
#[derive(Debug)]
pub(crate) struct Shared {
    index: AtomicI64,
    percent: AtomicU8,
    done: AtomicBool,
    pub(crate) cancel: CancelCell,
    pub(crate) gate: PauseGate,
}

impl Shared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            index: AtomicI64::new(0),
            percent: AtomicU8::new(0),
            done: AtomicBool::new(false),
            cancel: CancelCell::new(),
            gate: PauseGate::new(),
        })
    }

    pub(crate) fn index(&self) -> i64 {
        self.index.load(Ordering::Acquire)
    }

    pub(crate) fn percent(&self) -> u8 {
        self.percent.load(Ordering::Acquire)
    }

    fn set_index(&self, index: i64) {
        self.index.store(index, Ordering::Release);
    }

    fn set_percent(&self, percent: u8) {
        self.percent.store(percent, Ordering::Release);
    }

    /// Clean-exit signal observed by the watchdog. Set by the worker when it
    /// returns (completion, cancel, or fault), never on the abort path.
    pub(crate) fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
    }

    pub(crate) fn done_flag(&self) -> &AtomicBool {
        &self.done
    }
}

/// How one worker run ended. Converted into the terminal [`TaskState`]
/// (and the forced-abort case surfaces as a join error instead).
///
/// [`TaskState`]: crate::TaskState
#[derive(Debug)]
pub(crate) enum Outcome {
    Completed,
    Canceled,
    Faulted(TaskError),
}

/// Everything the loop driver needs besides the items themselves.
pub(crate) struct WorkerEnv {
    pub(crate) shared: Arc<Shared>,
    pub(crate) throttle: Throttle,
    pub(crate) total: Option<i64>,
    pub(crate) delay: Option<DelayFn>,
    pub(crate) bus: Bus,
    pub(crate) name: Arc<str>,
}

/// Per-item action used by the bulk-transform variant.
pub(crate) fn no_action<T>(_item: T) -> std::future::Ready<Result<(), TaskError>> {
    std::future::ready(Ok(()))
}

/// Drives the iteration loop over `items`, invoking `item_fn` per item.
pub(crate) async fn drive<It, T, F, Fut>(items: It, item_fn: F, env: WorkerEnv) -> Outcome
where
    It: Iterator<Item = T>,
    T: ItemIndex,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), TaskError>>,
{
    let mut index: i64 = 0;

    for item in items {
        let carried = item.item_index();
        match item_fn(item).await {
            Ok(()) => {}
            Err(TaskError::Canceled) => return Outcome::Canceled,
            Err(e) => return Outcome::Faulted(e),
        }
        index = carried.unwrap_or(index + 1);

        if !env.throttle.is_checkpoint(index) {
            continue;
        }
        if env.shared.cancel.is_requested() {
            return Outcome::Canceled;
        }
        if let Some(delay) = &env.delay {
            time::sleep(delay()).await;
        }
        if let Some(total) = env.total {
            env.shared.set_percent(percent_of(index, total));
        }
        env.shared.set_index(index);
        env.bus.publish(
            Event::new(EventKind::TaskProgress)
                .with_task(env.name.clone())
                .with_index(index)
                .with_percent(env.shared.percent()),
        );
        env.shared.gate.wait_if_paused().await;
        tokio::task::yield_now().await;
    }

    // Publish the final short batch too, then force 100 on clean completion.
    env.shared.set_index(index);
    env.shared.set_percent(100);
    Outcome::Completed
}
