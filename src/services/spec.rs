//! # Service declaration.
//!
//! Defines [`ServiceSpec`]: a unique name (`provides`), the names the service
//! must start after (`after`) and the [`ServiceRef`] to run.
//!
//! ## Rules
//! - `provides` must be non-empty and unique across the list passed to
//!   [`Bootstrap::run`](crate::Bootstrap::run) (checked by [`validate`]).
//! - `after` has set semantics: duplicates collapse, order is not significant.

use std::collections::HashSet;

use crate::error::RuntimeError;
use crate::services::ServiceRef;

/// Declaration of one service in the bootstrap graph.
///
/// ## Example
/// ```rust
/// use bootvisor::{Exit, Handoff, Registry, ServiceError, ServiceFn, ServiceSpec};
///
/// let http = ServiceSpec::new(
///     "http",
///     ServiceFn::arc(|_deps: Registry, _h: Handoff| async { Ok::<_, ServiceError>(Exit::SUCCESS) }),
/// )
/// .after(["mongo", "redis"]);
///
/// assert_eq!(http.provides(), "http");
/// assert_eq!(http.dependencies(), ["mongo", "redis"]);
/// ```
#[derive(Clone)]
pub struct ServiceSpec {
    provides: String,
    after: Vec<String>,
    service: ServiceRef,
}

impl ServiceSpec {
    /// Creates a declaration without dependencies.
    pub fn new(provides: impl Into<String>, service: ServiceRef) -> Self {
        Self {
            provides: provides.into(),
            after: Vec::new(),
            service,
        }
    }

    /// Returns a new spec that starts after the given services.
    pub fn after<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after.extend(names.into_iter().map(Into::into));
        self
    }

    /// Name this service provides.
    pub fn provides(&self) -> &str {
        &self.provides
    }

    /// Declared dependencies, as given (duplicates included).
    pub fn dependencies(&self) -> &[String] {
        &self.after
    }

    /// Service to run.
    pub fn service(&self) -> &ServiceRef {
        &self.service
    }
}

impl std::fmt::Debug for ServiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSpec")
            .field("provides", &self.provides)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}

/// Rejects empty and duplicate `provides` names.
pub(crate) fn validate(specs: &[ServiceSpec]) -> Result<(), RuntimeError> {
    let mut seen = HashSet::with_capacity(specs.len());
    let mut duplicates = Vec::new();

    for spec in specs {
        if spec.provides.trim().is_empty() {
            return Err(RuntimeError::InvalidSpec {
                reason: "service with an empty name".to_string(),
            });
        }
        if !seen.insert(spec.provides.as_str()) && !duplicates.contains(&spec.provides) {
            duplicates.push(spec.provides.clone());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(RuntimeError::InvalidSpec {
            reason: format!("duplicate service names: {}", duplicates.join(", ")),
        })
    }
}
