//! # Two-phase service abstraction.
//!
//! A [`Service`] runs in two phases separated by its single hand-off:
//!
//! ```text
//! run(registry, handoff)
//!   ├─ phase 1 (starting): read dependencies from `registry`, set up
//!   ├─ handoff.provide(impl).await   ── suspends until every dependent
//!   │                                   (and its whole subtree) finished
//!   └─ phase 2 (stopping): tear down, return own exit code
//! ```
//!
//! The terminal (root) service has no dependents and simply returns without
//! handing off.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Handoff;
use crate::error::ServiceError;
use crate::services::{Exit, Registry};

/// # Asynchronous two-phase service.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use bootvisor::{Exit, Handoff, Registry, Service, ServiceError};
///
/// struct Cache;
///
/// #[async_trait]
/// impl Service for Cache {
///     async fn run(&self, _deps: Registry, handoff: Handoff) -> Result<Exit, ServiceError> {
///         let downstream = handoff.provide(Arc::new(Cache)).await?;
///         // flush, close connections...
///         Ok(downstream)
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Runs both phases of the service.
    ///
    /// `registry` holds every implementation handed off by the service's
    /// (transitive) dependencies. Services with dependents must call
    /// [`Handoff::provide`] or [`Handoff::finish`] exactly once.
    async fn run(&self, registry: Registry, handoff: Handoff) -> Result<Exit, ServiceError>;
}

/// Shared handle to a service.
pub type ServiceRef = Arc<dyn Service>;
