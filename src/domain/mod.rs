//! Domain layer: the coverage tree and its algorithms
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod aggregation;
pub mod arena;
pub mod copy;
pub mod display;
pub mod error;
pub mod kind;
pub mod merge;
pub mod metric;
pub mod packages;
pub mod path;
pub mod search;
pub mod value;

pub use aggregation::{strategy_for, AggregationStrategy};
pub use arena::{CoverageTree, Node, NodeId, NodeRef, TreeSettings};
pub use display::TreeNodeConvert;
pub use error::{TreeError, TreeResult};
pub use kind::NodeKind;
pub use metric::Metric;
pub use packages::normalize_package_name;
pub use path::{DEFAULT_PACKAGE, ROOT_MARKER};
pub use search::IdentityHash;
pub use value::{Coverage, Value};
