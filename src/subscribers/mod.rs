//! # Event observers.
//!
//! Implement [`Subscribe`] to react to bus events; group subscribers in a
//! [`SubscriberSet`] and attach it to a bus with [`spawn_listener`]. The
//! `logging` feature adds `LogWriter`, a stdout subscriber for demos.

pub mod set;
pub mod subscriber;

#[cfg(feature = "logging")]
pub mod log;

pub use set::{SubscriberSet, spawn_listener};
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
