//! # Registry: the named roster of live tasks.
//!
//! Tasks register at creation and (with auto-delete enabled) remove
//! themselves on any terminal state. Names are unique: registering a second
//! task under a live name is refused and the duplicate is reported on the
//! bus, never silently replaced.
//!
//! The registry holds strong references; a task stays reachable (and its
//! progress readable) until it is removed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::events::{Bus, Event, EventKind};
use crate::task::temp::TempTask;

/// Thread-safe name-to-task roster.
pub struct Registry {
    tasks: Mutex<HashMap<String, Arc<TempTask>>>,
    bus: Bus,
}

impl Registry {
    /// Creates an empty registry reporting membership changes on `bus`.
    pub fn new(bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(HashMap::new()),
            bus,
        })
    }

    /// Adds `task` under its name. Returns `false` and publishes
    /// `TaskRejected` if the name is already taken.
    pub fn register(&self, task: Arc<TempTask>) -> bool {
        let name = task.name().to_string();
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if tasks.contains_key(&name) {
            drop(tasks);
            self.bus.publish(
                Event::new(EventKind::TaskRejected)
                    .with_task(name)
                    .with_reason("task_already_exists"),
            );
            return false;
        }
        tasks.insert(name.clone(), task);
        drop(tasks);
        self.bus
            .publish(Event::new(EventKind::TaskRegistered).with_task(name));
        true
    }

    /// Looks up a live task by name.
    pub fn get(&self, name: &str) -> Option<Arc<TempTask>> {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Removes a task from the roster; the task itself keeps running.
    pub fn remove(&self, name: &str) -> Option<Arc<TempTask>> {
        let removed = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        if removed.is_some() {
            self.bus
                .publish(Event::new(EventKind::TaskRemoved).with_task(name.to_string()));
        }
        removed
    }

    /// Requests cancellation of a registered task. Returns `true` only for
    /// the first effective request on a known name.
    pub fn cancel(&self, name: &str) -> bool {
        match self.get(name) {
            Some(task) => task.request_cancel(),
            None => false,
        }
    }

    /// Registered names, sorted for stable display.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
