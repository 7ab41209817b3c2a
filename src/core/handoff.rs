//! # Hand-off: the single point where a service meets its dependents.
//!
//! A service receives one [`Handoff`] and consumes it exactly once:
//!
//! ```text
//! handoff.provide(impl)
//!   ├─► registry' = registry + {name: impl}
//!   ├─► for each dependent: dependent.barrier.supply(name)(registry')   (fan-out)
//!   │        └─► last dependency in → dependent's service starts
//!   ├─► wait for every dependent's whole subtree (fail fast)
//!   └─► reduce their exit codes → returned to the service (phase 2 starts)
//! ```
//!
//! The root service has nothing downstream; calling its hand-off fails with
//! [`ServiceError::HandoffAtRoot`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use futures::future::try_join_all;

use super::reduce::{Reducer, reduce};
use crate::converge::{Converge, Handle};
use crate::error::{ConvergeError, ServiceError};
use crate::events::{Bus, Event, EventKind};
use crate::services::{Exit, Provided, Registry};

/// Registration of one dependent on one of its dependencies' barriers.
#[derive(Clone)]
pub(crate) struct Continuation {
    /// Dependent whose barrier is fed.
    pub(crate) dependent: String,
    /// Dependent's barrier, keyed by its dependency names.
    pub(crate) barrier: Arc<Converge<Registry, Exit>>,
    /// Key this continuation supplies (the dependency's name).
    pub(crate) key: String,
}

impl Continuation {
    fn resume(&self, registry: Registry) -> Result<Handle<Exit>, ConvergeError> {
        self.barrier.supply(&self.key)?.send(registry)
    }
}

/// What lies downstream of a service.
#[derive(Clone)]
pub(crate) enum Downstream {
    /// Root: nothing to hand off to.
    Terminal,
    /// One continuation per dependent.
    Dependents(Arc<[Continuation]>),
}

impl Downstream {
    pub(crate) fn expects_handoff(&self) -> bool {
        matches!(self, Downstream::Dependents(_))
    }
}

/// Shared between a [`Handoff`] and the runner that created it.
#[derive(Default)]
pub(crate) struct Progress {
    handed_off: AtomicBool,
    failure: OnceLock<ServiceError>,
}

impl Progress {
    pub(crate) fn handed_off(&self) -> bool {
        self.handed_off.load(Ordering::Acquire)
    }

    /// Error the hand-off returned to the service, if any.
    pub(crate) fn failure(&self) -> Option<ServiceError> {
        self.failure.get().cloned()
    }

    fn record(&self, err: &ServiceError) {
        let _ = self.failure.set(err.clone());
    }
}

/// One-shot hand-off given to a running service.
///
/// Consumed by [`provide`](Handoff::provide) or [`finish`](Handoff::finish),
/// so a service cannot hand off twice.
pub struct Handoff {
    service: Arc<str>,
    registry: Registry,
    downstream: Downstream,
    reducer: Reducer,
    bus: Bus,
    progress: Arc<Progress>,
}

impl Handoff {
    pub(crate) fn new(
        service: Arc<str>,
        registry: Registry,
        downstream: Downstream,
        reducer: Reducer,
        bus: Bus,
        progress: Arc<Progress>,
    ) -> Self {
        Self {
            service,
            registry,
            downstream,
            reducer,
            bus,
            progress,
        }
    }

    /// Publishes `implementation` under this service's name and waits until
    /// every dependent has finished both of its phases.
    ///
    /// Returns the dependents' combined exit code. If any dependent failed,
    /// the failure is returned here and the run fails even if the service
    /// ignores it. The same holds for [`ServiceError::HandoffAtRoot`].
    pub async fn provide(self, implementation: Provided) -> Result<Exit, ServiceError> {
        let registry = self.registry.with(self.service.as_ref(), implementation);
        self.converge(registry).await
    }

    /// Like [`provide`](Handoff::provide) for services that expose nothing to
    /// their dependents.
    pub async fn finish(self) -> Result<Exit, ServiceError> {
        let registry = self.registry.clone();
        self.converge(registry).await
    }

    /// Name of the service this hand-off belongs to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// True if the service has dependents to hand off to.
    pub fn has_dependents(&self) -> bool {
        self.downstream.expects_handoff()
    }

    async fn converge(self, registry: Registry) -> Result<Exit, ServiceError> {
        self.progress.handed_off.store(true, Ordering::Release);

        let continuations = match &self.downstream {
            Downstream::Terminal => {
                let err = ServiceError::HandoffAtRoot {
                    service: self.service.to_string(),
                };
                self.progress.record(&err);
                return Err(err);
            }
            Downstream::Dependents(c) => Arc::clone(c),
        };

        let dependents: Vec<String> = continuations.iter().map(|c| c.dependent.clone()).collect();
        self.bus.publish(
            Event::new(EventKind::ServiceProvided)
                .with_service(Arc::clone(&self.service))
                .with_names(dependents),
        );

        let outcome = self.wait_dependents(&continuations, registry).await;
        match outcome {
            Ok(code) => {
                self.bus.publish(
                    Event::new(EventKind::ServiceStopping)
                        .with_service(Arc::clone(&self.service))
                        .with_code(code.code()),
                );
                Ok(code)
            }
            Err(e) => {
                self.progress.record(&e);
                Err(e)
            }
        }
    }

    async fn wait_dependents(
        &self,
        continuations: &[Continuation],
        registry: Registry,
    ) -> Result<Exit, ServiceError> {
        let handles = continuations
            .iter()
            .map(|c| c.resume(registry.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let results = try_join_all(handles.into_iter().map(Handle::wait)).await?;
        Ok(reduce(&self.reducer, results))
    }
}

impl std::fmt::Debug for Handoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handoff")
            .field("service", &self.service)
            .field("registry", &self.registry)
            .field("has_dependents", &self.has_dependents())
            .finish_non_exhaustive()
    }
}
