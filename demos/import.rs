//! # Example: import
//!
//! A single background import task with throttled progress reporting.
//!
//! Demonstrates how to:
//! - Wire a [`Bus`] to a [`LogWriter`] subscriber via [`spawn_listener`].
//! - Create a per-item task with [`TempTask::for_each`].
//! - Deliver the continuation on the owning context.
//!
//! ## Flow
//! ```text
//! TempTask::for_each ──► worker loop
//!     ├─► publish(TaskStarting)
//!     ├─► publish(TaskProgress)   every 100th row
//!     ├─► publish(TaskCompleted)
//!     └─► OwnerHandle::invoke(continuation)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example import --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use temptask::{
    Bus, LogWriter, OwnerContext, SubscriberSet, TaskContext, TaskParams, TempTask, spawn_listener,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. Bus plus a stdout subscriber for every lifecycle event.
    let bus = Bus::new(256);
    let _listener = spawn_listener(&bus, Arc::new(SubscriberSet::new(vec![Arc::new(LogWriter)])));

    // 2. The owning context that will run the continuation.
    let (mut owner_ctx, owner) = OwnerContext::channel();
    let ctx = TaskContext::new(bus, owner);

    // 3. Import 1000 rows, checkpoint every 100th.
    let task = TempTask::for_each(
        "import-rows",
        1..=1_000i64,
        |_row| async {
            tokio::time::sleep(Duration::from_micros(200)).await;
            Ok(())
        },
        TaskParams::default()
            .with_notify_interval(100)
            .with_continuation(|final_index| println!("[owner] import finished at {final_index}")),
        &ctx,
    );

    task.wait().await;

    // 4. Continuations run here, on the owner, never on the worker.
    owner_ctx.run_pending();
}
