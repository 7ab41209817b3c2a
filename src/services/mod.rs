//! # Service abstractions and declarations.
//!
//! This module provides the service-related types:
//! - [`Service`] - trait for implementing two-phase async services
//! - [`ServiceFn`] - function-backed service implementation
//! - [`ServiceRef`] - shared reference to a service (`Arc<dyn Service>`)
//! - [`ServiceSpec`] - declaration binding a service to a name and its dependencies
//! - [`Registry`] - snapshot of implementations handed off by started dependencies
//! - [`Exit`] - exit code a service returns after teardown

mod exit;
mod registry;
mod service;
mod service_fn;
mod spec;

pub use exit::Exit;
pub use registry::{Provided, Registry};
pub use service::{Service, ServiceRef};
pub use service_fn::ServiceFn;
pub use spec::ServiceSpec;

pub(crate) use spec::validate;
