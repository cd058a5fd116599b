//! # Task lifecycle states.
//!
//! `Created → Running → {Completed | Canceled | Aborted | Faulted}`.
//! Transitions are monotonic; exactly one terminal state is ever reached and
//! there is no transition out of a terminal state.

/// Lifecycle state of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Constructed, worker not started.
    Created,
    /// Worker is executing (possibly paused at its gate).
    Running,
    /// Natural completion without cancellation.
    Completed,
    /// Cooperative cancellation observed at a checkpoint.
    Canceled,
    /// Forcibly terminated by the watchdog after the grace window.
    Aborted,
    /// Unexpected fault (error return or panic) from a user action.
    Faulted,
}

impl TaskState {
    /// True once the task has reached its single terminal outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Aborted | TaskState::Faulted
        )
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskState::Created => "created",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Canceled => "canceled",
            TaskState::Aborted => "aborted",
            TaskState::Faulted => "faulted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_predicate() {
        assert!(!TaskState::Created.is_terminal());
        assert!(!TaskState::Running.is_terminal());
        for s in [
            TaskState::Completed,
            TaskState::Canceled,
            TaskState::Aborted,
            TaskState::Faulted,
        ] {
            assert!(s.is_terminal(), "{} should be terminal", s.as_label());
        }
    }
}
