//! # Runtime events and the broadcast bus that carries them.
//!
//! [`Event`] is the sequenced record of what happened (lifecycle, progress,
//! roster changes); [`Bus`] fans events out to any number of observers.

pub mod bus;
pub mod event;

pub use bus::{Bus, DEFAULT_BUS_CAPACITY};
pub use event::{Event, EventKind};
