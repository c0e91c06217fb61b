use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::kind::NodeKind;
use crate::domain::metric::Metric;
use crate::domain::value::Value;

/// Handle of a node inside a [`CoverageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", index, generation)
    }
}

/// Structural rules applied when nodes are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Reject a child whose metric and name equal those of an existing sibling
    pub unique_sibling_names: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            unique_sibling_names: true,
        }
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) name: String,
    pub(crate) sources: Vec<String>,
    /// Indices of child nodes in the arena
    pub(crate) children: Vec<NodeId>,
    /// At most one value per metric
    pub(crate) values: BTreeMap<Metric, Value>,
    /// Index of parent node in the arena, None for root nodes
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, name: String) -> Self {
        Self {
            kind,
            name,
            sources: Vec::new(),
            children: Vec::new(),
            values: BTreeMap::new(),
            parent: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn metric(&self) -> Metric {
        self.kind.metric()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    /// Values stored directly at this node, ordered by metric.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    /// The value stored directly at this node (no aggregation).
    pub fn own_value(&self, metric: Metric) -> Option<&Value> {
        self.values.get(&metric)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_parent(&self) -> bool {
        !self.is_root()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} <{}>",
            self.metric(),
            self.name,
            self.children.len()
        )
    }
}

/// Arena-based forest of coverage nodes.
///
/// Nodes are created detached and become part of a hierarchy through
/// [`CoverageTree::add_child`]. Every parentless node is the root of its own
/// tree.
#[derive(Debug, Clone, Default)]
pub struct CoverageTree {
    arena: Arena<Node>,
    settings: TreeSettings,
}

impl CoverageTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: TreeSettings) -> Self {
        Self {
            arena: Arena::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Creates a detached node with the given kind and name.
    #[instrument(level = "trace", skip(self, name))]
    pub fn create_node(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        NodeId(self.arena.insert(Node::new(kind, name.into())))
    }

    pub fn create_container(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::Container, name)
    }

    pub fn create_module(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::Module, name)
    }

    pub fn create_package(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::Package, name)
    }

    pub fn create_file(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::File, name)
    }

    pub fn create_class(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::Class, name)
    }

    pub fn create_method(
        &mut self,
        name: impl Into<String>,
        signature: impl Into<String>,
        line_number: u32,
    ) -> NodeId {
        self.create_node(NodeKind::method(signature, line_number), name)
    }

    pub fn node(&self, id: NodeId) -> TreeResult<&Node> {
        self.arena.get(id.0).ok_or(TreeError::UnknownNode(id))
    }

    pub fn get(&self, id: NodeId) -> TreeResult<NodeRef<'_>> {
        self.node(id)?;
        Ok(NodeRef { tree: self, id })
    }

    /// The single parentless node, `None` if there is none or more than one.
    pub fn root(&self) -> Option<NodeRef<'_>> {
        let mut roots = self.roots();
        match (roots.next(), roots.next()) {
            (Some(root), None) => Some(root),
            _ => None,
        }
    }

    /// All parentless nodes in insertion order of the arena slots.
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.arena
            .iter()
            .filter(|(_, node)| node.is_root())
            .map(move |(index, _)| NodeRef {
                tree: self,
                id: NodeId(index),
            })
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// Adding a child twice to the same parent is a no-op. A child attached to
    /// a different parent must be removed there first.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        match child_node.parent {
            Some(current) if current == parent => {
                trace!("{} is already a child of {}", child_node, parent_node);
                return Ok(());
            }
            Some(current) => {
                return Err(TreeError::AlreadyAttached {
                    child: child_node.to_string(),
                    parent: self.describe(current),
                });
            }
            None => {}
        }

        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::CycleDetected {
                child: child_node.to_string(),
                parent: parent_node.to_string(),
            });
        }

        self.check_sibling(parent, child_node.metric(), &child_node.name)?;

        self.attach(parent, child);
        Ok(())
    }

    pub fn add_all_children(&mut self, parent: NodeId, children: &[NodeId]) -> TreeResult<()> {
        children
            .iter()
            .try_for_each(|&child| self.add_child(parent, child))
    }

    /// Detaches `child` from `parent`; the child becomes a root.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        let Some(position) = parent_node.children.iter().position(|&c| c == child) else {
            return Err(TreeError::NotAChild {
                child: child_node.to_string(),
                parent: parent_node.to_string(),
            });
        };

        self.n_mut(parent).children.remove(position);
        self.n_mut(child).parent = None;
        Ok(())
    }

    /// Detaches all children of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) -> TreeResult<()> {
        let children = self.node(parent)?.children.clone();
        children
            .into_iter()
            .try_for_each(|child| self.remove_child(parent, child))
    }

    /// Stores `value` at the node; each metric may only be stored once.
    #[instrument(level = "trace", skip(self))]
    pub fn add_value(&mut self, id: NodeId, value: Value) -> TreeResult<()> {
        let node = self.node(id)?;
        value.validate()?;
        if let Some(existing) = node.values.get(&value.metric()) {
            return Err(TreeError::DuplicateValue {
                node: node.to_string(),
                metric: value.metric(),
                value: existing.to_string(),
            });
        }
        self.n_mut(id).values.insert(value.metric(), value);
        Ok(())
    }

    pub fn add_all_values(&mut self, id: NodeId, values: &[Value]) -> TreeResult<()> {
        values
            .iter()
            .try_for_each(|&value| self.add_value(id, value))
    }

    pub fn add_source(&mut self, id: NodeId, source: impl Into<String>) -> TreeResult<()> {
        self.node(id)?;
        self.n_mut(id).sources.push(source.into());
        Ok(())
    }

    /// Fails if `parent` already has a child with this metric and name while
    /// sibling names have to be unique.
    pub(crate) fn check_sibling(&self, parent: NodeId, metric: Metric, name: &str) -> TreeResult<()> {
        if !self.settings.unique_sibling_names {
            return Ok(());
        }
        let parent_node = self.n(parent);
        let duplicate = parent_node.children.iter().any(|&sibling| {
            let sibling = self.n(sibling);
            sibling.metric() == metric && sibling.name == name
        });
        if duplicate {
            return Err(TreeError::DuplicateChild {
                parent: parent_node.to_string(),
                name: name.to_string(),
                metric,
            });
        }
        Ok(())
    }

    /// Links a fresh node below `parent` without structural checks.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        trace!("attach {} below {}", self.n(child), self.n(parent));
        self.n_mut(parent).children.push(child);
        self.n_mut(child).parent = Some(parent);
    }

    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        NodeId(self.arena.insert(node))
    }

    /// Removes a detached, childless node from the arena.
    pub(crate) fn discard(&mut self, id: NodeId) {
        debug_assert!(self.n(id).is_root() && !self.n(id).has_children());
        self.arena.remove(id.0);
    }

    /// Internal accessor for ids reachable from live nodes; only discarded
    /// nodes leave the arena and nothing links to them.
    pub(crate) fn n(&self, id: NodeId) -> &Node {
        &self.arena[id.0]
    }

    pub(crate) fn n_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id.0]
    }

    pub(crate) fn describe(&self, id: NodeId) -> String {
        self.arena
            .get(id.0)
            .map(|node| node.to_string())
            .unwrap_or_else(|| id.to_string())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, start: NodeId) -> bool {
        let mut current = Some(start);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.n(id).parent;
        }
        false
    }
}

/// Read-only view of one node together with the tree that owns it.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    pub(crate) tree: &'a CoverageTree,
    pub(crate) id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a CoverageTree {
        self.tree
    }

    pub fn node(&self) -> &'a Node {
        self.tree.n(self.id)
    }

    pub(crate) fn at(&self, id: NodeId) -> NodeRef<'a> {
        NodeRef { tree: self.tree, id }
    }

    /// Returns the parent node or [`TreeError::NoParent`] for a root.
    pub fn parent(&self) -> TreeResult<NodeRef<'a>> {
        self.node()
            .parent
            .map(|id| self.at(id))
            .ok_or_else(|| TreeError::NoParent(self.node().to_string()))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    /// Pre-order traversal of the subtree, children in order.
    pub fn iter(&self) -> SubtreeIterator<'a> {
        SubtreeIterator::new(*self)
    }

    /// Post-order traversal of the subtree: children before their parent.
    pub fn iter_postorder(&self) -> PostOrderIterator<'a> {
        PostOrderIterator::new(*self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }
}

impl<'a> Deref for NodeRef<'a> {
    type Target = Node;

    fn deref(&self) -> &Node {
        self.tree.n(self.id)
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.node(), f)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.node())
    }
}

/// Deep, order-sensitive equality over kind, name, sources and children;
/// values compare as a metric-keyed map. Works across arenas.
impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self.tree, other.tree) && self.id == other.id {
            return true;
        }
        let (left, right) = (self.node(), other.node());
        left.kind == right.kind
            && left.name == right.name
            && left.sources == right.sources
            && left.values == right.values
            && left.children.len() == right.children.len()
            && self.children().zip(other.children()).all(|(l, r)| l == r)
    }
}

impl Eq for NodeRef<'_> {}

impl Hash for NodeRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let node = self.node();
        node.kind.hash(state);
        node.name.hash(state);
        node.sources.hash(state);
        node.values.hash(state);
        node.children.len().hash(state);
        for child in self.children() {
            child.hash(state);
        }
    }
}

pub struct SubtreeIterator<'a> {
    tree: &'a CoverageTree,
    stack: Vec<NodeId>,
}

impl<'a> SubtreeIterator<'a> {
    fn new(start: NodeRef<'a>) -> Self {
        Self {
            tree: start.tree,
            stack: vec![start.id],
        }
    }
}

impl<'a> Iterator for SubtreeIterator<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for &child in self.tree.n(current).children.iter().rev() {
            self.stack.push(child);
        }
        Some(NodeRef {
            tree: self.tree,
            id: current,
        })
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a CoverageTree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(start: NodeRef<'a>) -> Self {
        Self {
            tree: start.tree,
            stack: vec![(start.id, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(NodeRef {
                    tree: self.tree,
                    id: current,
                });
            }
            self.stack.push((current, true));
            for &child in self.tree.n(current).children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}
