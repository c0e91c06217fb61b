use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::NodeRef;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for NodeRef<'_> {
    /// Subtree as an indented text tree, one line per node with its own values.
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let node = self.node();
        let label = if node.values.is_empty() {
            node.to_string()
        } else {
            let values: Vec<String> = node.values().map(|value| value.to_string()).collect();
            format!("{} {{{}}}", node, values.join(", "))
        };

        let leaves: Vec<_> = self.children().map(|c| c.to_tree_string()).collect();
        Tree::new(label).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoverageTree, Metric, Value};

    #[test]
    fn given_tree_when_rendered_then_each_node_is_one_line() {
        let mut tree = CoverageTree::new();
        let module = tree.create_module("app");
        let package = tree.create_package("a.b");
        tree.add_child(module, package).unwrap();
        tree.add_value(package, Value::coverage(Metric::Line, 1, 2))
            .unwrap();

        let rendered = tree.get(module).unwrap().to_tree_string().to_string();

        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.starts_with("[MODULE] app <1>"));
        assert!(rendered.contains("[PACKAGE] a.b <0> {LINE: 1/3}"));
    }
}
