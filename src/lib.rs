//! Coverage tree engine.
//!
//! A [`CoverageTree`](domain::CoverageTree) holds a hierarchy of coverage
//! nodes (module, package, file, class, method) carrying typed values. Trees
//! can be queried for aggregated metrics, paths and nodes, copied, and merged
//! with a tree of another run for the same subject.

pub mod config;
pub mod domain;
pub mod util;

pub use domain::{
    CoverageTree, IdentityHash, Metric, NodeId, NodeKind, NodeRef, TreeError, TreeResult, Value,
};
