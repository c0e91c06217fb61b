//! Structural merge of two trees describing the same subject.
//!
//! Values present on both sides are combined with
//! [`Value::max`](crate::domain::Value::max). Children are paired by name and
//! merged recursively; children only present in the other tree are copied
//! over. Inputs are never modified.

use tracing::{debug, enabled, instrument, trace, Level};

use crate::domain::arena::{CoverageTree, NodeId, NodeRef};
use crate::domain::display::TreeNodeConvert;
use crate::domain::error::{TreeError, TreeResult};

fn ensure_compatible(left: &NodeRef<'_>, right: &NodeRef<'_>) -> TreeResult<()> {
    if left.metric() != right.metric() {
        return Err(TreeError::MetricMismatch {
            left: left.to_string(),
            right: right.to_string(),
        });
    }
    if left.name() != right.name() {
        return Err(TreeError::NameMismatch {
            left: left.to_string(),
            right: right.to_string(),
        });
    }
    Ok(())
}

impl<'a> NodeRef<'a> {
    /// Merges the trees rooted at this node and at `other` into a new tree.
    ///
    /// Both roots need the same metric and name. The returned arena contains
    /// exactly one root, the merged node.
    #[instrument(level = "debug", skip(self, other), fields(left = %self, right = %other))]
    pub fn combine_with(&self, other: &NodeRef<'_>) -> TreeResult<CoverageTree> {
        ensure_compatible(self, other)?;

        let (mut combined, root) = self.snapshot();
        combined.reconcile(root, other)?;
        log_result(&combined, root);
        Ok(combined)
    }
}

impl CoverageTree {
    /// Merges the subtrees of `this` and `other` of this arena into a new
    /// detached subtree and returns its root. Neither input is changed.
    #[instrument(level = "debug", skip(self))]
    pub fn combine(&mut self, this: NodeId, other: NodeId) -> TreeResult<NodeId> {
        let left = self.get(this)?;
        let right = self.get(other)?;
        ensure_compatible(&left, &right)?;

        let (other_tree, other_root) = right.snapshot();
        let combined = self.copy_tree(this, None)?;
        self.reconcile(combined, &other_tree.get(other_root)?)?;
        log_result(self, combined);
        Ok(combined)
    }

    fn reconcile(&mut self, target: NodeId, other: &NodeRef<'_>) -> TreeResult<()> {
        for value in other.node().values() {
            let merged = match self.n(target).values.get(&value.metric()) {
                Some(existing) => existing.max(value)?,
                None => *value,
            };
            trace!(node = %self.n(target), %merged, "merged value");
            self.n_mut(target).values.insert(merged.metric(), merged);
        }

        for other_child in other.children() {
            let existing = self
                .n(target)
                .children
                .iter()
                .copied()
                .find(|&child| self.n(child).name == other_child.name());
            match existing {
                Some(child) => self.reconcile(child, &other_child)?,
                None => {
                    debug!("adopting {} below {}", other_child, self.n(target));
                    other_child.copy_tree_into(self, Some(target))?;
                }
            }
        }
        Ok(())
    }
}

fn log_result(tree: &CoverageTree, root: NodeId) {
    if enabled!(Level::TRACE) {
        if let Ok(node) = tree.get(root) {
            trace!("combined tree:\n{}", node.to_tree_string());
        }
    }
}
