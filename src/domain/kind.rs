//! Node kinds with their kind-specific data.

use crate::domain::metric::Metric;

/// Closed set of node kinds.
///
/// Kind-specific data lives in the variant, so copying a node only needs a
/// clone of its kind and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Container,
    Module,
    Package,
    File,
    Class,
    Method { signature: String, line_number: u32 },
}

impl NodeKind {
    pub fn method(signature: impl Into<String>, line_number: u32) -> Self {
        NodeKind::Method {
            signature: signature.into(),
            line_number,
        }
    }

    pub fn metric(&self) -> Metric {
        match self {
            NodeKind::Container => Metric::Container,
            NodeKind::Module => Metric::Module,
            NodeKind::Package => Metric::Package,
            NodeKind::File => Metric::File,
            NodeKind::Class => Metric::Class,
            NodeKind::Method { .. } => Metric::Method,
        }
    }

    /// Path fragment a node of this kind contributes, `None` for kinds that
    /// do not take part in path composition.
    pub(crate) fn local_path(&self, name: &str) -> Option<String> {
        match self {
            NodeKind::Package => Some(name.replace('.', "/")),
            NodeKind::File => Some(name.to_string()),
            _ => None,
        }
    }
}
