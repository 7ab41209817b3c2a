//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (bootstrap, runner,
//! hand-offs, subscriber workers).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Subscriber (one):
//!   Runner   ──┐
//!   Handoff  ──┼──────► Bus ───────► listener ────► SubscriberSet
//!   Bootstrap ─┤  (broadcast chan)   (in Bootstrap)
//!   Workers  ──┘
//! ```
//!
//! ## Rules
//! - `publish()` never waits; with no receiver attached the event is dropped.
//! - One ring buffer of `capacity` events is shared by every receiver.
//! - A receiver that falls behind gets `RecvError::Lagged(n)`; the bootstrap
//!   listener skips the gap and keeps going.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Clones share the same channel. Every service unit and hand-off of a run
/// holds one.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
