//! # Event subscribers for the bootvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in loggers for runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Runner/Handoff ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                │
//!                                                   ┌────────────┼────────────┐
//!                                                   ▼            ▼            ▼
//!                                                 LogFn      LogWriter     Custom
//! ```
//!
//! With no subscribers configured, events are simply dropped (no-op logger).

mod log_fn;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod embedded;

pub use log_fn::{LogFn, format_event};
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
