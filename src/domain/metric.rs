//! Metric kinds: structural levels of the tree and measured quantities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Totally ordered set of metric kinds.
///
/// The first six variants are container metrics: they name the structural
/// level a node represents. The remaining variants are leaf metrics that only
/// ever appear as values attached to nodes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    Container,
    Module,
    Package,
    File,
    Class,
    Method,
    Line,
    Branch,
    Instruction,
    Mutation,
    Complexity,
    Loc,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::Container,
        Metric::Module,
        Metric::Package,
        Metric::File,
        Metric::Class,
        Metric::Method,
        Metric::Line,
        Metric::Branch,
        Metric::Instruction,
        Metric::Mutation,
        Metric::Complexity,
        Metric::Loc,
    ];

    /// Returns `true` for metrics that describe a structural level of the tree.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Metric::Container
                | Metric::Module
                | Metric::Package
                | Metric::File
                | Metric::Class
                | Metric::Method
        )
    }

    /// Returns `true` for metrics that are only measured, never nodes.
    pub fn is_leaf(self) -> bool {
        !self.is_container()
    }

    /// Metrics whose values are plain integers rather than covered/missed pairs.
    pub fn is_integer(self) -> bool {
        matches!(self, Metric::Complexity | Metric::Loc)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Container => "CONTAINER",
            Metric::Module => "MODULE",
            Metric::Package => "PACKAGE",
            Metric::File => "FILE",
            Metric::Class => "CLASS",
            Metric::Method => "METHOD",
            Metric::Line => "LINE",
            Metric::Branch => "BRANCH",
            Metric::Instruction => "INSTRUCTION",
            Metric::Mutation => "MUTATION",
            Metric::Complexity => "COMPLEXITY",
            Metric::Loc => "LOC",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
