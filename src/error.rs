//! Error types produced by task execution.
//!
//! [`TaskError`] is returned by user-supplied item actions. The lifecycle
//! controller converts it into a terminal task state:
//!
//! - [`TaskError::Canceled`]: graceful exit, classified as `Canceled`.
//! - any other variant: classified as `Faulted` and logged with detail.
//!
//! Errors never escape to other threads; all user-visible failure signaling
//! happens through [`TaskState`](crate::TaskState) and published events.

use thiserror::Error;

/// # Errors produced by per-item actions and bulk transforms.
///
/// A fault is terminal for the whole task; there is no per-item retry.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Item action failed; the task transitions to `Faulted`.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Item action observed cancellation mid-item and bailed out.
    ///
    /// Treated as a graceful exit (`Canceled`), not a fault.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Creates a [`TaskError::Fail`] from any displayable error.
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use temptask::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}
