//! # Snapshot of started service implementations.
//!
//! A [`Registry`] maps service names to the implementation each one passed to
//! its hand-off. Every service receives its own snapshot: the engine builds it
//! by merging the registries of all dependencies and never mutates a snapshot
//! after handing it out.
//!
//! Implementations are opaque (`Arc<dyn Any + Send + Sync>`); dependents look
//! them up with the concrete type they agreed on with the provider.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bootvisor::Registry;
//!
//! struct Pool { size: usize }
//!
//! let reg = Registry::default().with("db", Arc::new(Pool { size: 4 }));
//! assert_eq!(reg.get::<Pool>("db").map(|p| p.size), Some(4));
//! assert!(reg.get::<String>("db").is_none());
//! ```

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;

/// Opaque handle to a running service implementation.
pub type Provided = Arc<dyn Any + Send + Sync>;

/// Immutable name → implementation map handed to a starting service.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Arc<IndexMap<String, Provided>>,
}

impl Registry {
    /// Returns a new registry with `name` bound to `provided`.
    #[must_use]
    pub fn with(&self, name: impl Into<String>, provided: Provided) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(name.into(), provided);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Merges several snapshots; on key collision the later snapshot wins.
    pub(crate) fn merge<'a>(parts: impl IntoIterator<Item = &'a Registry>) -> Self {
        let mut entries = IndexMap::new();
        for part in parts {
            for (k, v) in part.entries.iter() {
                entries.insert(k.clone(), Arc::clone(v));
            }
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns the implementation of `name` if it exists and has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries
            .get(name)
            .and_then(|p| Arc::clone(p).downcast::<T>().ok())
    }

    /// Returns the untyped implementation of `name`.
    pub fn get_raw(&self, name: &str) -> Option<&Provided> {
        self.entries.get(name)
    }

    /// True if `name` handed off an implementation.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in the registry, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been handed off yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
