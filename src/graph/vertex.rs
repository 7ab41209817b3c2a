use indexmap::IndexSet;

use crate::services::{ServiceRef, ServiceSpec};

/// One service's node in the dependency graph.
#[derive(Clone)]
pub struct Vertex {
    name: String,
    after: IndexSet<String>,
    pub(super) before: IndexSet<String>,
    service: ServiceRef,
}

impl Vertex {
    pub(super) fn from_spec(spec: &ServiceSpec) -> Self {
        Self {
            name: spec.provides().to_string(),
            after: spec.dependencies().iter().cloned().collect(),
            before: IndexSet::new(),
            service: spec.service().clone(),
        }
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Services this one starts after (its dependencies).
    pub fn after(&self) -> &IndexSet<String> {
        &self.after
    }

    /// Services that start after this one (its dependents).
    pub fn before(&self) -> &IndexSet<String> {
        &self.before
    }

    /// Service to run.
    pub fn service(&self) -> &ServiceRef {
        &self.service
    }

    /// True if nothing depends on this vertex.
    pub fn is_root(&self) -> bool {
        self.before.is_empty()
    }

    /// True if this vertex depends on nothing.
    pub fn is_source(&self) -> bool {
        self.after.is_empty()
    }
}

impl std::fmt::Debug for Vertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vertex")
            .field("name", &self.name)
            .field("after", &self.after)
            .field("before", &self.before)
            .finish_non_exhaustive()
    }
}
