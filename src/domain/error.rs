//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::metric::Metric;
use crate::domain::NodeId;

/// Domain errors represent violated tree preconditions.
///
/// Node descriptions use the display form `[METRIC] name <children>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("the node {child} is not a child of this node {parent}")]
    NotAChild { child: String, parent: String },

    #[error("the node {child} is already attached to {parent}")]
    AlreadyAttached { child: String, parent: String },

    #[error("adding {child} below {parent} would create a cycle")]
    CycleDetected { child: String, parent: String },

    #[error("node {parent} already has a child '{name}' with the metric {metric}")]
    DuplicateChild {
        parent: String,
        name: String,
        metric: Metric,
    },

    #[error("there is already a value {value} with the metric {metric} in node {node}")]
    DuplicateValue {
        node: String,
        metric: Metric,
        value: String,
    },

    #[error("invalid value for metric {metric}: {reason}")]
    InvalidValue { metric: Metric, reason: String },

    #[error("parent is not set for node {0}")]
    NoParent(String),

    #[error("cannot merge nodes of different metrics: {left} - {right}")]
    MetricMismatch { left: String, right: String },

    #[error("cannot merge nodes with different names: {left} - {right}")]
    NameMismatch { left: String, right: String },

    #[error("node {node} has no metric {metric}")]
    MissingValue { node: String, metric: Metric },

    #[error("cannot collect nodes for leaf metric {0}")]
    LeafMetricSearch(Metric),

    #[error("cannot combine values {left} and {right}")]
    IncompatibleValues { left: String, right: String },

    #[error("sum of {metric} values does not fit into 64 bits")]
    ValueOverflow { metric: Metric },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
