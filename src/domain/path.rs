//! Path composition and parent naming.

use itertools::Itertools;
use tracing::instrument;

use crate::domain::arena::NodeRef;

/// Name returned by [`NodeRef::parent_name`] for a node without parent.
pub const ROOT_MARKER: &str = "^";

/// Local path of the default (unnamed) package.
pub const DEFAULT_PACKAGE: &str = "-";

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl<'a> NodeRef<'a> {
    /// Returns the source code path of this node.
    ///
    /// Packages contribute their name with `.` replaced by `/`, files their
    /// name; all other kinds have an empty path.
    #[instrument(level = "trace", skip(self), fields(node = %self))]
    pub fn path(&self) -> String {
        match self.kind().local_path(self.name()) {
            Some(local) => self.merge_path(&local),
            None => String::new(),
        }
    }

    /// Prefixes `local_path` with the path of the parent chain.
    pub fn merge_path(&self, local_path: &str) -> String {
        if local_path == DEFAULT_PACKAGE {
            return String::new();
        }

        let Ok(parent) = self.parent() else {
            return local_path.to_string();
        };
        let parent_path = parent.path();
        if is_blank(&parent_path) {
            local_path.to_string()
        } else if is_blank(local_path) {
            parent_path
        } else {
            format!("{}/{}", parent_path, local_path)
        }
    }

    /// Returns the dotted names of the consecutive ancestors sharing the
    /// parent's metric, or [`ROOT_MARKER`] for a root.
    pub fn parent_name(&self) -> String {
        let Ok(parent) = self.parent() else {
            return ROOT_MARKER.to_string();
        };
        let metric = parent.metric();

        let mut names = Vec::new();
        let mut current = Some(parent);
        while let Some(node) = current.filter(|node| node.metric() == metric) {
            names.push(node.node().name());
            current = node.parent().ok();
        }
        names.iter().rev().join(".")
    }
}
