//! # Graph construction and validation.
//!
//! ## Rules
//! - `after` lists are deduplicated.
//! - Specs are indexed by `provides`; on a name collision the last one wins
//!   (uniqueness is enforced before the builder runs).
//! - Errors are reported in priority order: unknown dependencies, then
//!   self-dependencies, then cycles, then root count, then sources.
//!   Each error lists every offender.

use indexmap::IndexMap;

use super::{Vertex, tarjan};
use crate::error::GraphError;
use crate::services::ServiceSpec;

/// Validated, read-only dependency graph.
///
/// ## Invariants
/// - `before` is exactly the inverse of `after` across all vertices.
/// - No vertex reaches itself through `after` edges.
/// - Exactly one vertex has an empty `before` (the root).
/// - At least one vertex has an empty `after` (the sources).
#[derive(Clone, Debug)]
pub struct Graph {
    vertices: IndexMap<String, Vertex>,
    root: String,
    sources: Vec<String>,
}

impl Graph {
    /// Builds and validates the graph for the given declarations.
    ///
    /// ## Example
    /// ```rust
    /// use bootvisor::{Exit, Graph, Handoff, Registry, ServiceError, ServiceFn, ServiceSpec};
    ///
    /// let svc = || ServiceFn::arc(|_r: Registry, _h: Handoff| async { Ok::<_, ServiceError>(Exit::SUCCESS) });
    /// let graph = Graph::build(&[
    ///     ServiceSpec::new("config", svc()),
    ///     ServiceSpec::new("http", svc()).after(["config"]),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(graph.root(), "http");
    /// assert_eq!(graph.sources(), ["config"]);
    /// ```
    pub fn build(specs: &[ServiceSpec]) -> Result<Self, GraphError> {
        let mut vertices: IndexMap<String, Vertex> = IndexMap::with_capacity(specs.len());
        for spec in specs {
            vertices.insert(spec.provides().to_string(), Vertex::from_spec(spec));
        }

        scan_dependencies(&mut vertices)?;

        let cycles: Vec<Vec<String>> = tarjan::strongly_connected(&vertices)
            .into_iter()
            .filter(|c| c.len() > 1)
            .map(|mut ring| {
                ring.push(ring[0].clone());
                ring
            })
            .collect();
        if !cycles.is_empty() {
            return Err(GraphError::Cycles { cycles });
        }

        let roots: Vec<String> = vertices
            .values()
            .filter(|v| v.is_root())
            .map(|v| v.name().to_string())
            .collect();
        let root = match <[String; 1]>::try_from(roots) {
            Ok([root]) => root,
            Err(roots) => return Err(GraphError::RootCount { roots }),
        };

        let sources: Vec<String> = vertices
            .values()
            .filter(|v| v.is_source())
            .map(|v| v.name().to_string())
            .collect();
        if sources.is_empty() {
            return Err(GraphError::NoSources);
        }

        Ok(Self {
            vertices,
            root,
            sources,
        })
    }

    /// Name of the unique vertex nothing depends on.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Names of the vertices without dependencies, in declaration order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Looks a vertex up by name.
    pub fn get(&self, name: &str) -> Option<&Vertex> {
        self.vertices.get(name)
    }

    /// Iterates vertices in declaration order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false for a built graph; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Fills `before` from `after`; fails on unknown or self dependencies.
fn scan_dependencies(vertices: &mut IndexMap<String, Vertex>) -> Result<(), GraphError> {
    let mut unknowns: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut self_dependent: Vec<String> = Vec::new();
    let mut edges: Vec<(String, String)> = Vec::new();

    for vertex in vertices.values() {
        for dep in vertex.after() {
            if dep == vertex.name() {
                self_dependent.push(vertex.name().to_string());
            } else if !vertices.contains_key(dep) {
                unknowns
                    .entry(vertex.name().to_string())
                    .or_default()
                    .push(dep.clone());
            } else {
                edges.push((dep.clone(), vertex.name().to_string()));
            }
        }
    }

    if !unknowns.is_empty() {
        return Err(GraphError::UnknownDependencies {
            missing: unknowns.into_iter().collect(),
        });
    }
    if !self_dependent.is_empty() {
        return Err(GraphError::SelfDependencies {
            services: self_dependent,
        });
    }

    for (dep, dependent) in edges {
        if let Some(v) = vertices.get_mut(&dep) {
            v.before.insert(dependent);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::spec;

    #[test]
    fn test_linear_chain() {
        let g = Graph::build(&[spec("A", ""), spec("B", "A"), spec("C", "B")]).unwrap();

        assert_eq!(g.root(), "C");
        assert_eq!(g.sources(), ["A"]);
        assert_eq!(g.len(), 3);
        assert!(g.get("C").unwrap().before().is_empty());
    }

    #[test]
    fn test_before_is_inverse_of_after() {
        let g = Graph::build(&[
            spec("config", ""),
            spec("redis", "config"),
            spec("mongo", "config"),
            spec("http", "mongo redis"),
            spec("signals", "http"),
        ])
        .unwrap();

        for v in g.vertices() {
            for dep in v.after() {
                assert!(g.get(dep).unwrap().before().contains(v.name()));
            }
            for dependent in v.before() {
                assert!(g.get(dependent).unwrap().after().contains(v.name()));
            }
        }
        assert_eq!(g.root(), "signals");
        assert_eq!(g.sources(), ["config"]);
        assert_eq!(
            g.get("config").unwrap().before().iter().collect::<Vec<_>>(),
            ["redis", "mongo"]
        );
    }

    #[test]
    fn test_duplicate_dependencies_collapse() {
        let g = Graph::build(&[spec("A", ""), spec("B", "A A A")]).unwrap();
        assert_eq!(g.get("B").unwrap().after().len(), 1);
        assert_eq!(g.get("A").unwrap().before().len(), 1);
    }

    #[test]
    fn test_multiple_sources() {
        let g = Graph::build(&[
            spec("A1", ""),
            spec("A2", ""),
            spec("A3", ""),
            spec("B", "A1 A2 A3"),
        ])
        .unwrap();
        assert_eq!(g.sources(), ["A1", "A2", "A3"]);
        assert_eq!(g.root(), "B");
    }

    #[test]
    fn test_single_vertex_is_root_and_source() {
        let g = Graph::build(&[spec("A", "")]).unwrap();
        assert_eq!(g.root(), "A");
        assert_eq!(g.sources(), ["A"]);
    }

    #[test]
    fn test_unknown_dependency() {
        let err = Graph::build(&[spec("A", "UndefinedB")]).unwrap_err();
        assert!(err.to_string().contains("in A [UndefinedB]"));
    }

    #[test]
    fn test_every_unknown_dependency_is_reported() {
        let err = Graph::build(&[spec("A", "B UndefinedC"), spec("B", "UndefinedD")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownDependencies {
                missing: vec![
                    ("A".into(), vec!["UndefinedC".into()]),
                    ("B".into(), vec!["UndefinedD".into()]),
                ],
            }
        );
    }

    #[test]
    fn test_unknown_takes_priority_over_self_dependency() {
        let err = Graph::build(&[spec("A", "A"), spec("B", "Nope")]).unwrap_err();
        assert_eq!(err.as_label(), "graph_unknown_dependencies");
    }

    #[test]
    fn test_self_dependencies() {
        let err = Graph::build(&[spec("A", "A"), spec("B", "B")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::SelfDependencies {
                services: vec!["A".into(), "B".into()]
            }
        );
    }

    #[test]
    fn test_two_cycle_is_closed_ring() {
        let err = Graph::build(&[spec("A", "B"), spec("B", "A")]).unwrap_err();
        let GraphError::Cycles { cycles } = &err else {
            panic!("expected cycles, got {err:?}");
        };
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 3);
        assert_eq!(cycles[0].first(), cycles[0].last());
        assert!(err.to_string().contains("A => B"));
    }

    #[test]
    fn test_long_cycle_lists_exact_members() {
        let err = Graph::build(&[
            spec("root", "c1"),
            spec("c1", "c4"),
            spec("c2", "c1"),
            spec("c3", "c2"),
            spec("c4", "c3"),
        ])
        .unwrap_err();
        let GraphError::Cycles { cycles } = err else {
            panic!("expected cycles");
        };
        assert_eq!(cycles.len(), 1);
        let ring = &cycles[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());

        let mut members = ring[..4].to_vec();
        members.sort();
        assert_eq!(members, ["c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn test_every_cycle_is_reported() {
        let err = Graph::build(&[spec("A", "B"), spec("B", "A"), spec("C", "D"), spec("D", "C")])
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("found circular dependencies"));
        assert!(msg.contains("A => B"));
        assert!(msg.contains("C => D"));
    }

    #[test]
    fn test_multiple_roots() {
        let err = Graph::build(&[spec("A", ""), spec("B", "")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::RootCount {
                roots: vec!["A".into(), "B".into()]
            }
        );
        assert_eq!(err.to_string(), "must have exactly 1 root, actually: [A, B]");
    }

    #[test]
    fn test_empty_spec_list_has_no_root() {
        let err = Graph::build(&[]).unwrap_err();
        assert_eq!(err, GraphError::RootCount { roots: vec![] });
    }

    #[test]
    fn test_last_declaration_wins() {
        let err = Graph::build(&[spec("A", ""), spec("B", "A"), spec("B", "")]).unwrap_err();
        // the second B drops its edge to A, leaving two roots
        assert_eq!(
            err,
            GraphError::RootCount {
                roots: vec!["A".into(), "B".into()]
            }
        );
    }
}
