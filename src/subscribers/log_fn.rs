//! # Closure-backed logger.
//!
//! [`LogFn`] turns every event into one human-readable line and hands it to a
//! closure, e.g. to route bootstrap milestones into an application logger.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bootvisor::{LogFn, Subscribe};
//!
//! let logger: Arc<dyn Subscribe> = Arc::new(LogFn::new(|line| eprintln!("bootstrap: {line}")));
//! # let _ = logger;
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber forwarding formatted event lines to a closure.
pub struct LogFn<F> {
    f: F,
}

impl<F> LogFn<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    /// Wraps the closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Subscribe for LogFn<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    async fn on_event(&self, e: &Event) {
        (self.f)(&format_event(e));
    }

    fn name(&self) -> &'static str {
        "LogFn"
    }
}

/// Renders an event as a single `[kind] key=value ...` line.
pub fn format_event(e: &Event) -> String {
    let service = e.service.as_deref().unwrap_or("-");
    let names = e.names.as_deref().unwrap_or(&[]);
    let code = e.code.unwrap_or_default();
    let reason = e.reason.as_deref().unwrap_or("");

    match e.kind {
        EventKind::GraphBuilt => format!("[graph-built] root={service} sources={names:?}"),
        EventKind::ExecutionPlanned => format!("[planned] starters={names:?}"),
        EventKind::RunCompleted => format!("[run-completed] code={code}"),
        EventKind::RunFailed => format!("[run-failed] err={reason:?}"),
        EventKind::ServiceStarting => {
            format!("[starting] service={service} registry={names:?}")
        }
        EventKind::ServiceProvided => {
            format!("[provided] service={service} dependents={names:?}")
        }
        EventKind::ServiceStopping => {
            format!("[stopping] service={service} downstream={code}")
        }
        EventKind::ServiceStopped => format!("[stopped] service={service} code={code}"),
        EventKind::ServiceFailed => format!("[failed] service={service} err={reason:?}"),
        EventKind::SubscriberOverflow => {
            format!("[subscriber-overflow] subscriber={service} reason={reason:?}")
        }
        EventKind::SubscriberPanicked => {
            format!("[subscriber-panicked] subscriber={service} info={reason}")
        }
    }
}
