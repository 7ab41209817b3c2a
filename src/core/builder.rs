use std::sync::Arc;

use super::{Bootstrap, Config, Reducer, bitwise_or};
use crate::services::Exit;
use crate::subscribers::Subscribe;

/// Builder for constructing a [`Bootstrap`].
pub struct BootstrapBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    reducer: Reducer,
}

impl BootstrapBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            reducer: bitwise_or(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (graph built, service lifecycle,
    /// run result) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the default bitwise OR reducer.
    ///
    /// The reducer is applied pairwise wherever several exit codes meet, so
    /// it should be associative and commutative.
    pub fn with_reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(Exit, Exit) -> Exit + Send + Sync + 'static,
    {
        self.reducer = Arc::new(reducer);
        self
    }

    /// Builds the bootstrap.
    ///
    /// No task is spawned until [`Bootstrap::run`] is awaited.
    pub fn build(self) -> Bootstrap {
        Bootstrap::new_internal(self.cfg, self.subscribers, self.reducer)
    }
}

impl std::fmt::Debug for BootstrapBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapBuilder")
            .field("cfg", &self.cfg)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}
