//! # Runtime events emitted while building and running the service graph.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: graph built, execution planned, run completed/failed
//! - **Service lifecycle events**: starting, provided, stopping, stopped, failed
//! - **Subscriber events**: overflow and panics inside subscribers
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! service name, registry keys and exit codes.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use bootvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ServiceStopped)
//!     .with_service("http")
//!     .with_code(0);
//!
//! assert_eq!(ev.kind, EventKind::ServiceStopped);
//! assert_eq!(ev.service.as_deref(), Some("http"));
//! assert_eq!(ev.code, Some(0));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// Service declarations were validated into a graph.
    ///
    /// Sets:
    /// - `service`: root service name
    /// - `names`: source service names
    GraphBuilt,

    /// Convergence barriers are wired; starters are about to launch.
    ///
    /// Sets:
    /// - `names`: starter service names
    ExecutionPlanned,

    /// Every starter finished successfully.
    ///
    /// Sets:
    /// - `code`: combined exit code
    RunCompleted,

    /// The run failed (graph validation or a service failure).
    ///
    /// Sets:
    /// - `reason`: error message
    RunFailed,

    // === Service lifecycle events ===
    /// Service entered phase 1.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `names`: registry keys visible to the service
    ServiceStarting,

    /// Service handed off its implementation and waits for its dependents.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `names`: dependents being started
    ServiceProvided,

    /// Every dependent finished; service entered phase 2.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `code`: combined exit code of the dependents
    ServiceStopping,

    /// Service returned from phase 2.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `code`: service exit code
    ServiceStopped,

    /// Service failed (error, panic or hand-off misuse).
    ///
    /// Sets:
    /// - `service`: service name
    /// - `reason`: failure message
    ServiceFailed,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

impl EventKind {
    /// True for the last event a run publishes.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, EventKind::RunCompleted | EventKind::RunFailed)
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the service (or subscriber), if applicable.
    pub service: Option<Arc<str>>,
    /// Related names (registry keys, dependents, starters).
    pub names: Option<Arc<[String]>>,
    /// Exit code, if applicable.
    pub code: Option<i32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            names: None,
            code: None,
            reason: None,
        }
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches related names.
    #[inline]
    pub fn with_names(mut self, names: impl Into<Arc<[String]>>) -> Self {
        self.names = Some(names.into());
        self
    }

    /// Attaches an exit code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_service(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_reason(info)
    }
}
