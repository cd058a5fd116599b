//! # Subscriber trait for observing runtime events.
//!
//! Implement [`Subscribe`] to hook into the task lifecycle (logging, metrics,
//! UI updates). Subscribers receive every [`Event`] published on the bus, in
//! sequence order, and should return promptly: slow handlers delay the whole
//! fan-out and can make the bus receiver lag.

use async_trait::async_trait;

use crate::events::Event;

/// Observer of runtime events.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use temptask::{Event, EventKind, Subscribe};
///
/// struct Completions;
///
/// #[async_trait]
/// impl Subscribe for Completions {
///     fn name(&self) -> &str { "completions" }
///
///     async fn on_event(&self, event: &Event) {
///         if event.kind == EventKind::TaskCompleted {
///             // record it...
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync {
    /// Stable subscriber name for diagnostics.
    fn name(&self) -> &str {
        "subscriber"
    }

    /// Handles one event. Called sequentially, in `seq` order.
    async fn on_event(&self, event: &Event);
}
