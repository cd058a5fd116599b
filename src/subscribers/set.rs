//! # Fan-out of bus events to registered subscribers.
//!
//! [`SubscriberSet`] delivers each event to every subscriber sequentially.
//! [`spawn_listener`] wires a set to a [`Bus`]: a background task receives
//! events and fans them out until the bus closes.
//!
//! ## Lag behavior
//! If the listener falls behind the bus ring buffer it skips the lagged
//! events and continues with the newest ones; per-event delivery inside one
//! `emit` is never partial.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event};
use crate::subscribers::subscriber::Subscribe;

/// Ordered collection of subscribers sharing one event stream.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Delivers one event to every subscriber, in registration order.
    pub async fn emit(&self, event: &Event) {
        for sub in &self.subs {
            sub.on_event(event).await;
        }
    }

    /// Number of subscribers in the set.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// True if the set has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

/// Subscribes to the bus and forwards events to the set until the bus closes.
pub fn spawn_listener(bus: &Bus, set: Arc<SubscriberSet>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev).await,
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(_)) => continue,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let a = Arc::new(Counter(AtomicUsize::new(0)));
        let b = Arc::new(Counter(AtomicUsize::new(0)));
        let set = SubscriberSet::new(vec![a.clone(), b.clone()]);
        set.emit(&Event::new(EventKind::TaskStarting)).await;
        set.emit(&Event::new(EventKind::TaskCompleted)).await;
        assert_eq!(a.0.load(Ordering::SeqCst), 2);
        assert_eq!(b.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_listener_forwards_bus_events() {
        let bus = Bus::new(16);
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let listener = spawn_listener(&bus, Arc::new(SubscriberSet::new(vec![counter.clone()])));

        bus.publish(Event::new(EventKind::TaskStarting));
        bus.publish(Event::new(EventKind::TaskCompleted));
        drop(bus);
        listener.await.expect("listener exits when bus closes");

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }
}
