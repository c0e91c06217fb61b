//! Structural-only and full copies of nodes and subtrees.

use tracing::{debug, instrument};

use crate::domain::arena::{CoverageTree, Node, NodeId, NodeRef};
use crate::domain::error::TreeResult;

/// Pre-order list of detached node copies; each entry refers to the position
/// of its parent within the list.
type Blueprint = Vec<(Node, Option<usize>)>;

impl Node {
    /// Same kind and name, nothing else.
    pub(crate) fn copy_empty(&self) -> Node {
        Node::new(self.kind.clone(), self.name.clone())
    }

    fn copy_detached(&self) -> Node {
        Node {
            sources: self.sources.clone(),
            values: self.values.clone(),
            ..self.copy_empty()
        }
    }
}

impl<'a> NodeRef<'a> {
    fn blueprint(&self) -> Blueprint {
        let mut blueprint = Vec::new();
        let mut stack = vec![(self.id, None)];
        while let Some((id, parent_slot)) = stack.pop() {
            let node = self.tree.n(id);
            let slot = blueprint.len();
            blueprint.push((node.copy_detached(), parent_slot));
            for &child in node.children.iter().rev() {
                stack.push((child, Some(slot)));
            }
        }
        blueprint
    }

    /// Creates a node of the same kind and name in `dest`, without parent,
    /// children, values or sources.
    pub fn copy_empty_into(&self, dest: &mut CoverageTree) -> NodeId {
        dest.insert(self.node().copy_empty())
    }

    /// Copies the whole subtree into `dest`, optionally below `parent`.
    #[instrument(level = "debug", skip(self, dest), fields(node = %self))]
    pub fn copy_tree_into(
        &self,
        dest: &mut CoverageTree,
        parent: Option<NodeId>,
    ) -> TreeResult<NodeId> {
        if let Some(parent) = parent {
            dest.node(parent)?;
            dest.check_sibling(parent, self.metric(), self.name())?;
        }
        Ok(dest.build(self.blueprint(), parent))
    }

    /// Copies the subtree into a new arena where the copy is the only root.
    pub fn to_tree(&self) -> CoverageTree {
        self.snapshot().0
    }

    pub(crate) fn snapshot(&self) -> (CoverageTree, NodeId) {
        let mut tree = CoverageTree::with_settings(*self.tree.settings());
        let root = tree.build(self.blueprint(), None);
        (tree, root)
    }
}

impl CoverageTree {
    /// Creates a detached node with the kind and name of `id`.
    pub fn copy_empty(&mut self, id: NodeId) -> TreeResult<NodeId> {
        let copy = self.node(id)?.copy_empty();
        Ok(self.insert(copy))
    }

    /// Copies the subtree of `id` within this arena, optionally below
    /// `parent`. The copy shares no wiring with the original.
    #[instrument(level = "debug", skip(self))]
    pub fn copy_tree(&mut self, id: NodeId, parent: Option<NodeId>) -> TreeResult<NodeId> {
        let source = self.get(id)?;
        if let Some(parent) = parent {
            self.node(parent)?;
            self.check_sibling(parent, source.metric(), source.name())?;
        }
        let blueprint = source.blueprint();
        Ok(self.build(blueprint, parent))
    }

    fn build(&mut self, blueprint: Blueprint, parent: Option<NodeId>) -> NodeId {
        let mut created: Vec<NodeId> = Vec::with_capacity(blueprint.len());
        for (node, parent_slot) in blueprint {
            let id = self.insert(node);
            match parent_slot {
                Some(slot) => self.attach(created[slot], id),
                None => {
                    if let Some(parent) = parent {
                        self.attach(parent, id);
                    }
                }
            }
            created.push(id);
        }
        debug!("copied {} nodes", created.len());
        created[0]
    }
}
