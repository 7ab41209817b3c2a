//! Error types used by the bootvisor runtime, graph builder and services.
//!
//! This module defines four error enums:
//!
//! - [`GraphError`]: the service declarations do not form a valid graph.
//! - [`ConvergeError`]: misuse of a [`Converge`](crate::Converge) barrier.
//! - [`ServiceError`]: failures raised by (or on behalf of) a running service.
//! - [`RuntimeError`]: what [`Bootstrap::run`](crate::Bootstrap::run) returns.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced while building the dependency graph.
///
/// Every variant lists **all** offenders, not only the first one found,
/// so a broken configuration can be fixed in a single pass.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Some services depend on names nobody provides.
    #[error("unknown dependencies found {}", format_unknowns(.missing))]
    UnknownDependencies {
        /// `(service, unresolved names)` pairs in declaration order.
        missing: Vec<(String, Vec<String>)>,
    },

    /// Some services list themselves in `after`.
    #[error("{}", format_self_dependent(.services))]
    SelfDependencies {
        /// Self-referencing services in declaration order.
        services: Vec<String>,
    },

    /// The graph contains at least one cycle.
    #[error("{}", format_cycles(.cycles))]
    Cycles {
        /// Each cycle as a closed ring (the first element is repeated at the end).
        cycles: Vec<Vec<String>>,
    },

    /// Not exactly one service is left without dependents.
    #[error("must have exactly 1 root, actually: [{}]", .roots.join(", "))]
    RootCount {
        /// Every service nothing depends on.
        roots: Vec<String>,
    },

    /// No service can start without waiting on another one.
    #[error("no source services found (every service has dependencies)")]
    NoSources,
}

impl GraphError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use bootvisor::GraphError;
    ///
    /// let err = GraphError::RootCount { roots: vec!["a".into(), "b".into()] };
    /// assert_eq!(err.as_label(), "graph_root_count");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            GraphError::UnknownDependencies { .. } => "graph_unknown_dependencies",
            GraphError::SelfDependencies { .. } => "graph_self_dependencies",
            GraphError::Cycles { .. } => "graph_cycles",
            GraphError::RootCount { .. } => "graph_root_count",
            GraphError::NoSources => "graph_no_sources",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

fn format_unknowns(missing: &[(String, Vec<String>)]) -> String {
    missing
        .iter()
        .map(|(service, names)| format!("in {service} [{}]", names.join(", ")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_self_dependent(services: &[String]) -> String {
    if services.len() == 1 {
        format!("service has a dependency to itself: {}", services[0])
    } else {
        format!(
            "services having a dependency to themselves: {}",
            services.join(", ")
        )
    }
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    let noun = if cycles.len() == 1 {
        "dependency"
    } else {
        "dependencies"
    };
    let rings: Vec<String> = cycles
        .iter()
        .map(|ring| format!("[{}]", ring.join(" => ")))
        .collect();
    format!("found circular {noun}:\n\t{}", rings.join("\n\t"))
}

/// # Errors produced by misusing a convergence barrier.
///
/// These indicate a wiring bug rather than a service failure: they are
/// returned synchronously at the call site and never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvergeError {
    /// [`Converge::set_action`](crate::Converge::set_action) was called twice.
    #[error("action already set")]
    ActionAlreadySet,

    /// The key was never part of the barrier's participant set.
    #[error("unexpected source for \"{key}\"")]
    UnexpectedKey {
        /// Offending key.
        key: String,
    },

    /// The key is part of the set but has already received its value.
    #[error("duplicate source for \"{key}\"")]
    DuplicateKey {
        /// Offending key.
        key: String,
    },

    /// A value was supplied after the barrier already fired.
    #[error("unexpected value for \"{key}\", already converged")]
    AlreadyConverged {
        /// Offending key.
        key: String,
    },

    /// The last value arrived but no action was registered.
    #[error("set completed but no action set")]
    MissingAction,
}

impl ConvergeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConvergeError::ActionAlreadySet => "converge_action_already_set",
            ConvergeError::UnexpectedKey { .. } => "converge_unexpected_key",
            ConvergeError::DuplicateKey { .. } => "converge_duplicate_key",
            ConvergeError::AlreadyConverged { .. } => "converge_already_converged",
            ConvergeError::MissingAction => "converge_missing_action",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by service execution.
///
/// A service failure travels the failure branch of every outcome channel it
/// reaches, so the type is `Clone`: one barrier outcome is handed to all of
/// the barrier's waiters.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Service execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The root service called its hand-off; nothing depends on it.
    #[error("service '{service}' is the root and cannot hand off")]
    HandoffAtRoot {
        /// Root service name.
        service: String,
    },

    /// A service with dependents returned without handing off.
    #[error("service '{service}' returned without handing off to its dependents")]
    MissingHandoff {
        /// Service name.
        service: String,
    },

    /// A service panicked.
    #[error("service '{service}' panicked: {info}")]
    Panicked {
        /// Service name.
        service: String,
        /// Panic payload, when it is a string.
        info: String,
    },

    /// A barrier outcome was dropped before it was produced.
    #[error("outcome abandoned before it was produced")]
    Abandoned,

    /// The engine misused a convergence barrier.
    #[error("wiring error: {0}")]
    Wiring(#[from] ConvergeError),
}

impl ServiceError {
    /// Shorthand for [`ServiceError::Fail`].
    ///
    /// # Example
    /// ```
    /// use bootvisor::ServiceError;
    ///
    /// let err = ServiceError::fail("connection refused");
    /// assert_eq!(err.as_label(), "service_failed");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ServiceError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Fail { .. } => "service_failed",
            ServiceError::HandoffAtRoot { .. } => "service_handoff_at_root",
            ServiceError::MissingHandoff { .. } => "service_missing_handoff",
            ServiceError::Panicked { .. } => "service_panicked",
            ServiceError::Abandoned => "service_abandoned",
            ServiceError::Wiring(_) => "service_wiring",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Fail { error } => format!("error: {error}"),
            other => other.to_string(),
        }
    }
}

/// # Errors returned by [`Bootstrap::run`](crate::Bootstrap::run).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The service declarations are malformed (empty or duplicate names).
    #[error("invalid service declarations: {reason}")]
    InvalidSpec {
        /// What is wrong with the declarations.
        reason: String,
    },

    /// Graph validation failed; no service was started.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A service failed; the run was aborted.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use bootvisor::{GraphError, RuntimeError};
    ///
    /// let err = RuntimeError::from(GraphError::NoSources);
    /// assert_eq!(err.as_label(), "graph_no_sources");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidSpec { .. } => "runtime_invalid_spec",
            RuntimeError::Graph(e) => e.as_label(),
            RuntimeError::Service(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvalidSpec { reason } => format!("invalid spec: {reason}"),
            RuntimeError::Graph(e) => e.as_message(),
            RuntimeError::Service(e) => e.as_message(),
        }
    }
}
