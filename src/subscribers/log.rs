//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format, covering
//! the three reporting categories: informational completion, warning on
//! forced termination, and error detail on fault.
//!
//! ## Output format
//! ```text
//! [starting] task=import
//! [progress] task=import index=500 percent=50
//! [completed] task=import index=1000
//! [canceled] task=import index=120
//! [warn] [aborted] task=import index=3 reason="forced termination after grace period"
//! [error] [faulted] task=import reason="error: row 5 unreadable"
//! ```
//!
//! Not intended for production use; implement a custom [`Subscribe`] for
//! structured logging or metrics collection.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::subscriber::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions for debugging and demonstration purposes.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    fn name(&self) -> &str {
        "log_writer"
    }

    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskStarting => {
                println!("[starting] task={:?}", e.task);
            }
            EventKind::TaskProgress => {
                println!(
                    "[progress] task={:?} index={:?} percent={:?}",
                    e.task, e.index, e.percent
                );
            }
            EventKind::TaskCompleted => {
                println!("[completed] task={:?} index={:?}", e.task, e.index);
            }
            EventKind::TaskCanceled => {
                println!("[canceled] task={:?} index={:?}", e.task, e.index);
            }
            EventKind::TaskAborted => {
                println!(
                    "[warn] [aborted] task={:?} index={:?} reason={:?}",
                    e.task, e.index, e.reason
                );
            }
            EventKind::TaskFaulted => {
                println!("[error] [faulted] task={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::TaskRegistered => {
                println!("[registered] task={:?}", e.task);
            }
            EventKind::TaskRejected => {
                println!("[rejected] task={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::TaskRemoved => {
                println!("[removed] task={:?}", e.task);
            }
        }
    }
}
