//! # Execution engine: turn a validated graph into running services.
//!
//! Wiring walks the graph from the root down through `after` edges. Every
//! non-source vertex gets a [`Converge`] barrier keyed by its dependency
//! names; every dependency registers one continuation per dependent into
//! that barrier. Once a vertex has a continuation from each of its
//! dependents it is bound: its service becomes a [`Unit`], and the unit
//! becomes either its own barrier's action or, for sources, a starter.
//!
//! ```text
//!             root (bound first, Downstream::Terminal)
//!            ╱    ╲
//!   barrier(root) keyed by root.after
//!          ▲          ▲
//!    cont(mid→root)  cont(src→root)
//!          │          │
//!         mid ◄── bound once every dependent registered
//!          │
//!         src ──► starter
//! ```
//!
//! Launching spawns every starter on its own task with an empty registry
//! and reduces their exit codes. The first failure aborts the wait; the
//! remaining starters are left to finish in the background.

use std::sync::Arc;

use futures::future::try_join_all;
use indexmap::{IndexMap, IndexSet};
use tokio::task::JoinError;

use super::handoff::{Continuation, Downstream};
use super::reduce::{Reducer, reduce};
use super::runner::{Unit, panic_message};
use crate::converge::Converge;
use crate::error::{ConvergeError, ServiceError};
use crate::events::Bus;
use crate::graph::{Graph, Vertex};
use crate::services::{Exit, Registry};

type Barrier = Arc<Converge<Registry, Exit>>;

/// Wired graph, ready to launch.
pub(crate) struct Plan {
    starters: Vec<Arc<Unit>>,
    reducer: Reducer,
}

impl Plan {
    /// Names of the services started with an empty registry.
    pub(crate) fn starters(&self) -> Vec<String> {
        self.starters.iter().map(|u| u.name().to_string()).collect()
    }

    /// Runs every starter and reduces their exit codes.
    pub(crate) async fn launch(self) -> Result<Exit, ServiceError> {
        let runs = self.starters.into_iter().map(|unit| {
            let name = unit.name().to_string();
            let handle = tokio::spawn(async move { unit.run(Registry::default()).await });
            async move {
                match handle.await {
                    Ok(res) => res,
                    Err(e) => Err(join_failure(name, e)),
                }
            }
        });

        let codes = try_join_all(runs).await?;
        Ok(reduce(&self.reducer, codes))
    }
}

fn join_failure(service: String, err: JoinError) -> ServiceError {
    if err.is_panic() {
        ServiceError::Panicked {
            service,
            info: panic_message(err.into_panic().as_ref()),
        }
    } else {
        ServiceError::Abandoned
    }
}

/// Wires convergence barriers for every vertex of `graph`.
///
/// # Panics
/// If the graph is inconsistent (a vertex registered more continuations
/// than it has dependents, or some vertex was never bound). [`Graph::build`]
/// rules both out.
pub(crate) fn wire(graph: &Graph, reducer: &Reducer, bus: &Bus) -> Result<Plan, ConvergeError> {
    let mut wiring = Wiring {
        graph,
        reducer,
        bus,
        barriers: IndexMap::new(),
        continuations: IndexMap::new(),
        bound: IndexSet::new(),
        visited: IndexSet::new(),
        starters: Vec::new(),
    };

    wiring.bind(graph.root(), Downstream::Terminal)?;
    wiring.visit(graph.root())?;

    assert_eq!(
        wiring.bound.len(),
        graph.len(),
        "every service must be bound after wiring"
    );

    Ok(Plan {
        starters: wiring.starters,
        reducer: Arc::clone(reducer),
    })
}

struct Wiring<'g> {
    graph: &'g Graph,
    reducer: &'g Reducer,
    bus: &'g Bus,
    barriers: IndexMap<String, Barrier>,
    /// dependency → (dependent → continuation)
    continuations: IndexMap<String, IndexMap<String, Continuation>>,
    bound: IndexSet<String>,
    visited: IndexSet<String>,
    starters: Vec<Arc<Unit>>,
}

impl<'g> Wiring<'g> {
    fn vertex(&self, name: &str) -> &'g Vertex {
        self.graph
            .get(name)
            .unwrap_or_else(|| panic!("unknown service '{name}' during wiring"))
    }

    fn barrier(&mut self, name: &str) -> Barrier {
        if let Some(b) = self.barriers.get(name) {
            return Arc::clone(b);
        }
        let barrier = Converge::new(self.vertex(name).after().iter().cloned());
        self.barriers.insert(name.to_string(), Arc::clone(&barrier));
        barrier
    }

    fn visit(&mut self, name: &str) -> Result<(), ConvergeError> {
        if !self.visited.insert(name.to_string()) {
            return Ok(());
        }
        let vertex = self.vertex(name);
        if vertex.is_source() {
            return Ok(());
        }

        let deps: Vec<String> = vertex.after().iter().cloned().collect();
        let barrier = self.barrier(name);
        for dep in deps {
            self.continuations.entry(dep.clone()).or_default().insert(
                name.to_string(),
                Continuation {
                    dependent: name.to_string(),
                    barrier: Arc::clone(&barrier),
                    key: dep.clone(),
                },
            );
            self.try_bind(&dep)?;
            self.visit(&dep)?;
        }
        Ok(())
    }

    fn try_bind(&mut self, name: &str) -> Result<(), ConvergeError> {
        let registered = self.continuations.get(name).map_or(0, IndexMap::len);
        let expected = self.vertex(name).before().len();
        assert!(
            registered <= expected,
            "service '{name}' has {registered} continuations for {expected} dependents"
        );

        if registered < expected || self.bound.contains(name) {
            return Ok(());
        }
        let continuations: Arc<[Continuation]> = self
            .continuations
            .get(name)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        self.bind(name, Downstream::Dependents(continuations))
    }

    fn bind(&mut self, name: &str, downstream: Downstream) -> Result<(), ConvergeError> {
        let vertex = self.vertex(name);
        let unit = Arc::new(Unit::new(
            name,
            Arc::clone(vertex.service()),
            downstream,
            Arc::clone(self.reducer),
            self.bus.clone(),
        ));
        let is_source = vertex.is_source();
        self.bound.insert(name.to_string());

        if is_source {
            self.starters.push(unit);
            return Ok(());
        }
        self.barrier(name).set_action(move |inputs| async move {
            let registry = Registry::merge(inputs.values());
            unit.run(registry).await
        })
    }
}
