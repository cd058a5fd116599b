//! # temptask
//!
//! Managed, cancellable background tasks over iteration sources, with
//! throttled progress checkpoints, a watchdog-bounded cancellation protocol,
//! and completion continuations marshalled back to the owning context.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │          Registry           │  named roster,
//!                    │  register / get / remove    │  dup names refused
//!                    └──────────────┬──────────────┘
//!                                   │
//!   TempTask::for_each ────────► TempTask ◄──────── TempTask::transform
//!   (per-item action)               │               (bulk transform)
//!                 ┌─────────────────┼──────────────────┐
//!                 ▼                 ▼                  ▼
//!            worker task      watchdog armer      monitor task
//!            drive() loop     grace window,       joins worker,
//!            checkpoints      forced abort        terminal state
//!                 │                                    │
//!                 ▼                                    ▼
//!            Bus (events) ──► SubscriberSet       OwnerHandle ──► continuation
//! ```
//!
//! ## Lifecycle
//!
//! `Created → Running → {Completed | Canceled | Aborted | Faulted}`
//!
//! - **Completed**: the source is exhausted; the final index is published and
//!   percent is forced to 100.
//! - **Canceled**: a cancellation request was observed at a checkpoint, or a
//!   per-item action returned [`TaskError::Canceled`].
//! - **Aborted**: the worker failed to exit within the watchdog grace window
//!   (100ms x 10 by default) and its future was dropped.
//! - **Faulted**: a per-item action returned an error or panicked. The
//!   continuation is NOT invoked on this path.
//!
//! ## Quick start
//!
//! ```no_run
//! use temptask::{Bus, OwnerContext, TaskContext, TaskParams, TempTask};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (mut owner_ctx, owner) = OwnerContext::channel();
//!     let ctx = TaskContext::new(Bus::new(1024), owner);
//!
//!     let task = TempTask::for_each(
//!         "import-rows",
//!         0..10_000i64,
//!         |row| async move {
//!             let _ = row; // process one row
//!             Ok(())
//!         },
//!         TaskParams::default()
//!             .with_notify_interval(100)
//!             .with_continuation(|final_index| println!("finished at {final_index}")),
//!         &ctx,
//!     );
//!
//!     task.wait().await;
//!     owner_ctx.run_pending(); // continuation runs here, on the owner
//! }
//! ```
//!
//! ## Feature flags
//!
//! - `logging`: enables [`LogWriter`], a stdout subscriber for lifecycle and
//!   progress events.

mod cancel;
mod dispatch;
mod error;
mod events;
mod gate;
mod progress;
mod registry;
mod subscribers;
mod task;
mod watchdog;

pub use dispatch::{OwnerContext, OwnerHandle};
pub use error::TaskError;
pub use events::{Bus, DEFAULT_BUS_CAPACITY, Event, EventKind};
pub use gate::PauseGate;
pub use progress::Throttle;
pub use registry::Registry;
pub use subscribers::{Subscribe, SubscriberSet, spawn_listener};
pub use task::{Continuation, DelayFn, ItemIndex, TaskContext, TaskParams, TaskState, TempTask};
pub use watchdog::{Watchdog, WatchdogOutcome, WatchdogPolicy};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
