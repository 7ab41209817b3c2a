//! Convergence barrier: N-to-one-to-N synchronization.
//!
//! A [`Converge`] is created with a fixed set of participant keys. Each
//! participant supplies one value; when the last one arrives the registered
//! action runs **once** over the complete map, and its outcome is broadcast
//! to every [`Handle`].
//!
//! ```text
//!  supply("a")(va) ──┐                       ┌──► Handle ─► outcome
//!  supply("b")(vb) ──┼──► {a: va, b: vb, c: vc} ──► action ──► watch ──┼──► Handle ─► outcome
//!  supply("c")(vc) ──┘        (last value fires)                 └──► Handle ─► outcome
//! ```
//!
//! The engine uses one barrier per service to fan in the registries handed
//! off by all of that service's dependencies.

mod barrier;
mod handle;

pub use barrier::{Converge, Supplier};
pub use handle::{Handle, Outcome};
