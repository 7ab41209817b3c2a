//! # Exit code reduction.
//!
//! Results meeting at a fan-in point (a service's dependents, or the
//! starters at the top level) are combined pairwise with a [`Reducer`]. The
//! reducer should be associative and commutative since arrival order is not
//! fixed. An empty set of results reduces to [`Exit::SUCCESS`].

use std::sync::Arc;

use crate::services::Exit;

/// Pairwise combination of exit codes.
pub type Reducer = Arc<dyn Fn(Exit, Exit) -> Exit + Send + Sync>;

/// The default reducer: bitwise OR (`1 | 2 == 3`).
pub fn bitwise_or() -> Reducer {
    Arc::new(|a, b| a | b)
}

pub(crate) fn reduce(reducer: &Reducer, results: impl IntoIterator<Item = Exit>) -> Exit {
    results
        .into_iter()
        .reduce(|acc, next| reducer(acc, next))
        .unwrap_or_default()
}
