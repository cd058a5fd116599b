//! # Task lifecycle: parameters, states, items, and the controller.

pub mod item;
pub mod params;
pub mod state;
pub mod temp;

pub(crate) mod worker;

pub use item::ItemIndex;
pub use params::{Continuation, DelayFn, TaskContext, TaskParams};
pub use state::TaskState;
pub use temp::TempTask;
