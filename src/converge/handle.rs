//! # Single-producer, many-consumer outcome handle.
//!
//! A [`Handle`] is a receiver on the barrier's `watch` channel. The channel
//! starts empty (`None`) and is written exactly once when the action
//! completes, so handles obtained before completion suspend and handles
//! obtained after resolve immediately with the cached outcome.

use tokio::sync::watch;

use crate::error::ServiceError;

/// Result of a barrier action.
pub type Outcome<T> = Result<T, ServiceError>;

/// Awaitable view of a barrier outcome.
#[derive(Debug, Clone)]
pub struct Handle<T> {
    rx: watch::Receiver<Option<Outcome<T>>>,
}

impl<T: Clone> Handle<T> {
    pub(crate) fn new(rx: watch::Receiver<Option<Outcome<T>>>) -> Self {
        Self { rx }
    }

    /// Waits for the action's outcome.
    ///
    /// Resolves to [`ServiceError::Abandoned`] if the producer went away
    /// without publishing (action dropped or missing).
    pub async fn wait(mut self) -> Outcome<T> {
        let current = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| ServiceError::Abandoned)?;
        match &*current {
            Some(outcome) => outcome.clone(),
            None => Err(ServiceError::Abandoned),
        }
    }

    /// Returns the outcome if it is already available.
    pub fn try_get(&self) -> Option<Outcome<T>> {
        self.rx.borrow().clone()
    }
}
