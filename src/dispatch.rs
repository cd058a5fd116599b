//! # Owning-context dispatcher for continuations.
//!
//! Completion callbacks must run on the owning ("UI") context, never inline on
//! a worker or watchdog task. Instead of an ambient UI-thread global, the
//! dispatch mechanism is an explicit pair:
//!
//! - [`OwnerHandle`]: cheap to clone, held by tasks; [`OwnerHandle::invoke`]
//!   queues a callback without blocking.
//! - [`OwnerContext`]: owned by the distinguished context; drains and runs
//!   queued callbacks via [`OwnerContext::run_pending`] (poll-style, e.g. from
//!   a frame/idle handler) or [`OwnerContext::run`] (serve until all handles
//!   drop).
//!
//! If the owning context is dropped, queued callbacks are dropped with it;
//! `invoke` never fails loudly.

use tokio::sync::mpsc;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Queues callbacks onto the owning context. Clone freely.
#[derive(Clone, Debug)]
pub struct OwnerHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl OwnerHandle {
    /// Queues `f` to run on the owning context.
    ///
    /// Never blocks. If the [`OwnerContext`] is gone, `f` is dropped.
    pub fn invoke(&self, f: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Box::new(f));
    }
}

/// The distinguished execution context that runs queued callbacks.
#[derive(Debug)]
pub struct OwnerContext {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl OwnerContext {
    /// Creates a context and a handle feeding it.
    pub fn channel() -> (OwnerContext, OwnerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (OwnerContext { rx }, OwnerHandle { tx })
    }

    /// Runs all currently queued callbacks without blocking.
    ///
    /// Returns how many callbacks ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Runs callbacks as they arrive until every [`OwnerHandle`] is dropped.
    pub async fn run(&mut self) {
        while let Some(job) = self.rx.recv().await {
            job();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_run_pending_drains_in_order() {
        let (mut ctx, handle) = OwnerContext::channel();
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            handle.invoke(move || log.lock().expect("log lock").push(i));
        }
        assert_eq!(ctx.run_pending(), 3);
        assert_eq!(*log.lock().expect("log lock"), vec![0, 1, 2]);
        assert_eq!(ctx.run_pending(), 0);
    }

    #[tokio::test]
    async fn test_run_serves_until_handles_drop() {
        let (mut ctx, handle) = OwnerContext::channel();
        let count = Arc::new(AtomicUsize::new(0));
        {
            let count = count.clone();
            handle.invoke(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        drop(handle);
        ctx.run().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invoke_after_context_drop_is_silent() {
        let (ctx, handle) = OwnerContext::channel();
        drop(ctx);
        handle.invoke(|| panic!("must never run"));
    }
}
