//! # bootvisor
//!
//! **Bootvisor** starts a set of interdependent async services in dependency
//! order and tears them down in reverse order.
//!
//! Each service declares the name it provides and the names it starts
//! after. Bootvisor validates the declarations into a graph with exactly one
//! root, wires a convergence barrier in front of every service that has
//! dependencies, and runs every service through a two-phase protocol: phase
//! one sets the service up and hands its implementation to its dependents,
//! phase two runs after all of them have finished.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ServiceSpec  │   │ ServiceSpec  │   │ ServiceSpec  │
//!     │  "config"    │   │ "redis"      │   │ "http"       │
//!     │  after: []   │   │ after:config │   │ after: redis │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Graph::build (validation + Tarjan SCC)                           │
//! │  - unknown / self dependencies, cycles                            │
//! │  - exactly one root, at least one source                          │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Engine (one Converge barrier per non-source service)             │
//! │                                                                   │
//! │   config ──handoff──► [barrier redis] ──► redis                   │
//! │                                            │                      │
//! │                              handoff──► [barrier http] ──► http   │
//! │                                                                   │
//! │   exit codes flow back down the same path and are reduced        │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                  (capacity: Config::bus_capacity)                 │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       │    (in Bootstrap)      │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌────────┼─────────┐
//!                          ▼        ▼         ▼
//!                       worker1  worker2   workerN
//! ```
//!
//! ### Lifecycle of one service
//! ```text
//! all dependencies handed off ──► barrier fires once
//!   ├─► publish ServiceStarting{ service, registry keys }
//!   ├─► service.run(registry, handoff)          (phase 1)
//!   │       └─► handoff.provide(impl)
//!   │             ├─► publish ServiceProvided{ dependents }
//!   │             ├─► feed every dependent's barrier
//!   │             ├─► wait for all dependents (fail fast)
//!   │             └─► publish ServiceStopping{ reduced code }
//!   ├─► ... teardown ...                         (phase 2)
//!   └─► publish ServiceStopped{ code } | ServiceFailed{ reason }
//! ```
//!
//! ## Features
//! | Area               | Description                                                   | Key types / traits                          |
//! |--------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Services**       | Define services as trait impls or closures.                   | [`Service`], [`ServiceFn`], [`ServiceSpec`] |
//! | **Hand-off**       | Publish an implementation and wait for dependents.            | [`Handoff`], [`Registry`], [`Exit`]         |
//! | **Graph**          | Validation and cycle detection.                               | [`Graph`], [`Vertex`]                       |
//! | **Convergence**    | N-to-one-to-N barrier with a single broadcast outcome.        | [`Converge`], [`Handle`]                    |
//! | **Subscriber API** | Hook into run and service lifecycle events.                   | [`Subscribe`], [`LogFn`]                    |
//! | **Errors**         | Typed errors for graphs, barriers, services and runs.         | [`GraphError`], [`RuntimeError`]            |
//! | **Configuration**  | Bus capacity and the exit code reducer.                       | [`Config`], [`BootstrapBuilder`]            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bootvisor::{Bootstrap, Config, Exit, Handoff, Registry, ServiceError, ServiceFn, ServiceSpec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn bootvisor::Subscribe>> = vec![Arc::new(bootvisor::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn bootvisor::Subscribe>> = Vec::new();
//!
//!     let boot = Bootstrap::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let database = ServiceFn::arc(|_deps: Registry, handoff: Handoff| async move {
//!         // phase 1: connect, then hand the pool to dependents
//!         let code = handoff.provide(Arc::new(String::from("pool"))).await?;
//!         // phase 2: dependents are done, close the pool
//!         Ok(code)
//!     });
//!     let api = ServiceFn::arc(|deps: Registry, _handoff: Handoff| async move {
//!         let pool = deps.get::<String>("database").ok_or_else(|| ServiceError::fail("no pool"))?;
//!         assert_eq!(pool.as_str(), "pool");
//!         Ok(Exit::new(3))
//!     });
//!
//!     let code = boot
//!         .run(vec![
//!             ServiceSpec::new("database", database),
//!             ServiceSpec::new("api", api).after(["database"]),
//!         ])
//!         .await?;
//!
//!     assert_eq!(code, Exit::new(3));
//!     Ok(())
//! }
//! ```
mod converge;
mod core;
mod error;
mod events;
mod graph;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use converge::{Converge, Handle, Outcome, Supplier};
pub use core::{Bootstrap, BootstrapBuilder, Config, Handoff, Reducer, bitwise_or, run};
pub use error::{ConvergeError, GraphError, RuntimeError, ServiceError};
pub use events::{Bus, Event, EventKind};
pub use graph::{Graph, Vertex};
pub use services::{Exit, Provided, Registry, Service, ServiceFn, ServiceRef, ServiceSpec};
pub use subscribers::{LogFn, Subscribe, SubscriberSet, format_event};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
