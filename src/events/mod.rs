//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Bootstrap`, the engine's service runner, `Handoff`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the listener spawned by `Bootstrap`, which fans out to the
//!   `SubscriberSet` until the run's terminal event.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
