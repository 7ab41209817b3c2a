//! # Bootstrap: validate, wire and run a set of services once.
//!
//! The [`Bootstrap`] owns the event bus, the subscribers and the reducer.
//! A run goes through these steps:
//!
//! ```text
//! Vec<ServiceSpec> ──► validate (empty/duplicate names)
//!                  ──► Graph::build ──► publish GraphBuilt{ root, sources }
//!                  ──► engine::wire ──► publish ExecutionPlanned{ starters }
//!                  ──► Plan::launch (starters in parallel, fail fast)
//!                  ──► publish RunCompleted{ code } | RunFailed{ reason }
//!
//! Event flow:
//!   Unit/Handoff ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(Event)
//!                                                      └─► stops after RunCompleted/RunFailed
//! ```
//!
//! `run` returns only after the listener has handed every event up to the
//! terminal one to the subscribers and their workers have drained.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bootvisor::{Bootstrap, Config, Exit, Handoff, Registry, ServiceError, ServiceFn, ServiceSpec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceFn::arc(|_deps: Registry, handoff: Handoff| async move {
//!         handoff.provide(Arc::new(8080_u16)).await
//!     });
//!     let http = ServiceFn::arc(|deps: Registry, _handoff: Handoff| async move {
//!         let port = deps.get::<u16>("config").ok_or_else(|| ServiceError::fail("no config"))?;
//!         Ok(Exit::new(i32::from(*port != 8080)))
//!     });
//!
//!     let code = Bootstrap::builder(Config::default())
//!         .build()
//!         .run(vec![
//!             ServiceSpec::new("config", config),
//!             ServiceSpec::new("http", http).after(["config"]),
//!         ])
//!         .await?;
//!
//!     assert_eq!(code, Exit::SUCCESS);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::builder::BootstrapBuilder;
use super::engine;
use super::{Config, Reducer};
use crate::error::{RuntimeError, ServiceError};
use crate::events::{Bus, Event, EventKind};
use crate::graph::Graph;
use crate::services::{Exit, ServiceSpec, validate};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Single-run service orchestrator.
pub struct Bootstrap {
    cfg: Config,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    reducer: Reducer,
}

impl Bootstrap {
    /// Returns a builder with the given configuration.
    pub fn builder(cfg: Config) -> BootstrapBuilder {
        BootstrapBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
        reducer: Reducer,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            subscribers,
            reducer,
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus of this bootstrap.
    ///
    /// Receivers obtained before [`run`](Bootstrap::run) observe the whole run.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Validates `specs`, builds the graph and runs every service.
    ///
    /// Returns the combined exit code of the starters, or the first failure
    /// (invalid declarations, graph errors, service failures).
    pub async fn run(self, specs: Vec<ServiceSpec>) -> Result<Exit, RuntimeError> {
        let listener = self.subscriber_listener();
        let res = self.prepare(&specs);
        let res = match res {
            Ok(graph) => self.execute(graph).await,
            Err(e) => Err(e),
        };
        self.finish(res, listener).await
    }

    /// Runs an already validated graph.
    pub async fn run_graph(self, graph: Graph) -> Result<Exit, RuntimeError> {
        let listener = self.subscriber_listener();
        let res = self.execute(graph).await;
        self.finish(res, listener).await
    }

    fn prepare(&self, specs: &[ServiceSpec]) -> Result<Graph, RuntimeError> {
        validate(specs)?;
        Ok(Graph::build(specs)?)
    }

    async fn execute(&self, graph: Graph) -> Result<Exit, RuntimeError> {
        self.bus.publish(
            Event::new(EventKind::GraphBuilt)
                .with_service(graph.root())
                .with_names(graph.sources().to_vec()),
        );

        let plan = engine::wire(&graph, &self.reducer, &self.bus).map_err(ServiceError::from)?;
        self.bus
            .publish(Event::new(EventKind::ExecutionPlanned).with_names(plan.starters()));

        Ok(plan.launch().await?)
    }

    async fn finish(
        &self,
        res: Result<Exit, RuntimeError>,
        listener: Option<JoinHandle<()>>,
    ) -> Result<Exit, RuntimeError> {
        match &res {
            Ok(code) => self
                .bus
                .publish(Event::new(EventKind::RunCompleted).with_code(code.code())),
            Err(e) => self
                .bus
                .publish(Event::new(EventKind::RunFailed).with_reason(e.as_message())),
        }
        if let Some(listener) = listener {
            let _ = listener.await;
        }
        res
    }

    /// Forwards bus events to the subscriber set until the run's terminal event.
    fn subscriber_listener(&self) -> Option<JoinHandle<()>> {
        if self.subscribers.is_empty() {
            return None;
        }
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());

        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        let terminal = ev.kind.is_terminal();
                        set.emit(ev);
                        if terminal {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        }))
    }
}

impl std::fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("cfg", &self.cfg)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

/// Runs `specs` with the default configuration, no subscribers and the
/// bitwise OR reducer.
pub async fn run(specs: Vec<ServiceSpec>) -> Result<Exit, RuntimeError> {
    Bootstrap::builder(Config::default()).build().run(specs).await
}
