//! Search by metric and name, and best-effort lookup by identity hash.

use std::fmt;

use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::domain::arena::NodeRef;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::metric::Metric;

/// Stable 64-bit hash of a node name or path.
///
/// Derived from the first eight bytes of the SHA-256 digest. It is an
/// optimization for bulk matching: distinct strings may collide, so a match
/// by hash is not a proof of identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityHash(u64);

impl IdentityHash {
    pub fn of(value: &str) -> Self {
        let digest = Sha256::digest(value.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(prefix))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<&str> for IdentityHash {
    fn from(value: &str) -> Self {
        Self::of(value)
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.to_be_bytes()))
    }
}

impl<'a> NodeRef<'a> {
    /// Returns all nodes of the subtree with the given container metric,
    /// descendants before this node.
    ///
    /// Leaf metrics never form nodes and are rejected.
    #[instrument(level = "trace", skip(self), fields(node = %self))]
    pub fn get_all(&self, metric: Metric) -> TreeResult<Vec<NodeRef<'a>>> {
        if metric.is_leaf() {
            return Err(TreeError::LeafMetricSearch(metric));
        }
        Ok(self
            .iter_postorder()
            .filter(|node| node.metric() == metric)
            .collect())
    }

    /// Finds a node with the given metric and name in this subtree.
    ///
    /// This node is checked first, then the children depth-first in order.
    pub fn find(&self, metric: Metric, name: &str) -> Option<NodeRef<'a>> {
        self.iter().find(|node| node.matches(metric, name))
    }

    /// Finds a node with the given metric whose name or path hashes to `hash`.
    pub fn find_by_hash(&self, metric: Metric, hash: IdentityHash) -> Option<NodeRef<'a>> {
        self.iter().find(|node| node.matches_hash(metric, hash))
    }

    /// Exact match on metric and name.
    pub fn matches(&self, metric: Metric, name: &str) -> bool {
        self.metric() == metric && self.name() == name
    }

    /// Match on metric plus either the hash of the name or of the path.
    pub fn matches_hash(&self, metric: Metric, hash: IdentityHash) -> bool {
        if self.metric() != metric {
            return false;
        }
        IdentityHash::of(self.name()) == hash || IdentityHash::of(&self.path()) == hash
    }
}
