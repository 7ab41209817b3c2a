//! Dependency graph: validation and cycle detection.
//!
//! [`Graph::build`] turns a flat list of [`ServiceSpec`](crate::ServiceSpec)s
//! into a validated graph:
//!
//! ```text
//! specs ──► vertices (after deduped) ──► scan after → before
//!       ──► unknown deps? ──► self deps? ──► Tarjan SCC cycles?
//!       ──► exactly one root (empty before)? ──► at least one source (empty after)?
//!       ──► Graph { vertices, root, sources }
//! ```
//!
//! The graph is read-only once built.

mod builder;
mod tarjan;
mod vertex;

pub use builder::Graph;
pub use vertex::Vertex;
