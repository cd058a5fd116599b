//! # Example: cancel
//!
//! Two cancellation paths side by side:
//! - a cooperative worker that observes the request at its next checkpoint,
//! - a stuck worker that ignores checkpoints and is forced out by the
//!   watchdog after the one second grace window.
//!
//! ## Run
//! ```bash
//! cargo run --example cancel
//! ```

use std::time::Duration;

use temptask::{Bus, OwnerContext, Registry, TaskContext, TaskParams, TaskState, TempTask};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let bus = Bus::new(256);
    let (mut owner_ctx, owner) = OwnerContext::channel();
    let registry = Registry::new(bus.clone());
    let ctx = TaskContext::new(bus, owner).with_registry(registry.clone());

    // Cooperative: the request is observed at the next checkpoint.
    let polite = TempTask::for_each(
        "polite",
        1..=1_000_000i64,
        |_row| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(())
        },
        TaskParams::default().with_continuation(|i| println!("[owner] polite stopped at {i}")),
        &ctx,
    );
    tokio::time::sleep(Duration::from_millis(55)).await;
    registry.cancel("polite");
    println!("polite -> {}", polite.wait().await.as_label());

    // Stuck: never reaches a checkpoint; the watchdog aborts after ~1s.
    let stuck = TempTask::for_each(
        "stuck",
        vec!["blob"],
        |_blob| async {
            std::future::pending::<()>().await;
            Ok(())
        },
        TaskParams::default().with_continuation(|i| println!("[owner] stuck aborted at {i}")),
        &ctx,
    );
    stuck.request_cancel();
    println!("stuck -> {}", stuck.wait().await.as_label());
    assert_eq!(stuck.state(), TaskState::Aborted);

    owner_ctx.run_pending();
}
