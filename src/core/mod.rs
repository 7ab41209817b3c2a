//! Runtime core: wiring and lifecycle.
//!
//! The public API from this module is [`Bootstrap`] (plus its builder and
//! config), the [`Handoff`] given to every service, and the [`Reducer`]
//! used to combine exit codes.
//!
//! Internal modules:
//! - [`engine`]: wires convergence barriers over the graph and launches starters;
//! - [`runner`]: runs one service through both phases, catching panics;
//! - [`handoff`]: hands a service's implementation to its dependents;
//! - [`reduce`]: exit code reduction;
//! - [`bootstrap`]: validation, event listener, run result.

mod bootstrap;
mod builder;
mod config;
mod engine;
mod handoff;
mod reduce;
mod runner;

pub use bootstrap::{Bootstrap, run};
pub use builder::BootstrapBuilder;
pub use config::Config;
pub use handoff::Handoff;
pub use reduce::{Reducer, bitwise_or};

pub(crate) use runner::panic_message;
