//! # Run a single service through both of its phases.
//!
//! A [`Unit`] is one graph vertex bound to everything it needs at run time:
//! its service, what lies downstream, the reducer and the bus.
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   publish ServiceStarting → service.run(registry, handoff)
//!                               └─► handoff (ServiceProvided … ServiceStopping)
//!                           → Ok(code) → publish ServiceStopped
//!
//! Failure:
//!   service.run() → Err(e) / panic / missing hand-off → publish ServiceFailed
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `ServiceStopped` or `ServiceFailed`
//! - Panics are caught and reported as [`ServiceError::Panicked`]
//! - A failure returned by the hand-off wins over whatever the service returned
//! - A service with dependents must hand off, otherwise [`ServiceError::MissingHandoff`]

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::handoff::{Downstream, Handoff, Progress};
use super::reduce::Reducer;
use crate::error::ServiceError;
use crate::events::{Bus, Event, EventKind};
use crate::services::{Exit, Registry, ServiceRef};

/// A service ready to run.
pub(crate) struct Unit {
    name: Arc<str>,
    service: ServiceRef,
    downstream: Downstream,
    reducer: Reducer,
    bus: Bus,
}

impl Unit {
    pub(crate) fn new(
        name: &str,
        service: ServiceRef,
        downstream: Downstream,
        reducer: Reducer,
        bus: Bus,
    ) -> Self {
        Self {
            name: Arc::from(name),
            service,
            downstream,
            reducer,
            bus,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Runs the service with `registry` and returns its exit code.
    ///
    /// Resolves only after the whole subtree above this service has finished.
    pub(crate) async fn run(&self, registry: Registry) -> Result<Exit, ServiceError> {
        self.publish_starting(&registry);

        let progress = Arc::new(Progress::default());
        let handoff = Handoff::new(
            Arc::clone(&self.name),
            registry.clone(),
            self.downstream.clone(),
            Arc::clone(&self.reducer),
            self.bus.clone(),
            Arc::clone(&progress),
        );

        let res = match AssertUnwindSafe(self.service.run(registry, handoff))
            .catch_unwind()
            .await
        {
            Ok(res) => res,
            Err(panic_err) => Err(ServiceError::Panicked {
                service: self.name.to_string(),
                info: panic_message(panic_err.as_ref()),
            }),
        };

        let res = self.settle(res, &progress);
        match &res {
            Ok(code) => self.publish_stopped(*code),
            Err(e) => self.publish_failed(e),
        }
        res
    }

    fn settle(
        &self,
        res: Result<Exit, ServiceError>,
        progress: &Progress,
    ) -> Result<Exit, ServiceError> {
        if res.is_err() {
            return res;
        }
        if let Some(failure) = progress.failure() {
            return Err(failure);
        }
        if self.downstream.expects_handoff() && !progress.handed_off() {
            return Err(ServiceError::MissingHandoff {
                service: self.name.to_string(),
            });
        }
        res
    }

    fn publish_starting(&self, registry: &Registry) {
        self.bus.publish(
            Event::new(EventKind::ServiceStarting)
                .with_service(Arc::clone(&self.name))
                .with_names(registry.keys()),
        );
    }

    fn publish_stopped(&self, code: Exit) {
        self.bus.publish(
            Event::new(EventKind::ServiceStopped)
                .with_service(Arc::clone(&self.name))
                .with_code(code.code()),
        );
    }

    fn publish_failed(&self, err: &ServiceError) {
        self.bus.publish(
            Event::new(EventKind::ServiceFailed)
                .with_service(Arc::clone(&self.name))
                .with_reason(err.as_message()),
        );
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
