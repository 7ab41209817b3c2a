//! # Function-backed service (`ServiceFn`)
//!
//! [`ServiceFn`] wraps a closure `F: Fn(Registry, Handoff) -> Fut`, producing a
//! fresh future per run.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bootvisor::{Exit, Handoff, Registry, ServiceError, ServiceFn, ServiceRef};
//!
//! let redis: ServiceRef = ServiceFn::arc(|deps: Registry, handoff: Handoff| async move {
//!     let _config = deps.get::<String>("config");
//!     let code = handoff.provide(Arc::new("redis-client".to_string())).await?;
//!     Ok::<_, ServiceError>(code)
//! });
//! # let _ = redis;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Handoff;
use crate::error::ServiceError;
use crate::services::{Exit, Registry, Service};

/// Function-backed service implementation.
#[derive(Debug)]
pub struct ServiceFn<F> {
    f: F,
}

impl<F, Fut> ServiceFn<F>
where
    F: Fn(Registry, Handoff) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Exit, ServiceError>> + Send + 'static,
{
    /// Creates a new function-backed service.
    ///
    /// Prefer [`ServiceFn::arc`] when you immediately need a [`ServiceRef`](crate::ServiceRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the service and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Service for ServiceFn<F>
where
    F: Fn(Registry, Handoff) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Exit, ServiceError>> + Send + 'static,
{
    async fn run(&self, registry: Registry, handoff: Handoff) -> Result<Exit, ServiceError> {
        (self.f)(registry, handoff).await
    }
}
