//! Package name normalization and splitting of dotted package nodes.

use tracing::{debug, instrument};

use crate::domain::arena::{CoverageTree, NodeId};
use crate::domain::error::TreeResult;
use crate::domain::metric::Metric;
use crate::domain::value::Value;

/// Converts path separators in a package name to dots.
///
/// `edu/hm/hafner` and `edu\hm\hafner` both become `edu.hm.hafner`.
pub fn normalize_package_name(name: &str) -> String {
    name.replace(['/', '\\'], ".")
}

impl CoverageTree {
    /// Replaces dotted package children of `id` (`a.b`) by nested package
    /// chains (`a` containing `b`).
    ///
    /// Packages with the same name on one level are joined: the contents of a
    /// split package go to the innermost package of its chain, values of both
    /// sides are combined with [`Value::max`].
    #[instrument(level = "debug", skip(self))]
    pub fn split_packages(&mut self, id: NodeId) -> TreeResult<()> {
        let packages: Vec<NodeId> = self
            .node(id)?
            .children
            .iter()
            .copied()
            .filter(|&child| self.n(child).metric() == Metric::Package)
            .collect();
        for &package in &packages {
            self.remove_child(id, package)?;
        }

        for (index, &package) in packages.iter().enumerate() {
            if let Err(err) = self.split_package(id, package) {
                for &pending in &packages[index..] {
                    self.attach(id, pending);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn split_package(&mut self, id: NodeId, package: NodeId) -> TreeResult<()> {
        let name = self.n(package).name.clone();
        let parts: Vec<&str> = name.split('.').filter(|part| !part.is_empty()).collect();
        let Some((last, prefix)) = parts.split_last() else {
            self.attach(id, package);
            return Ok(());
        };

        let mut parent = id;
        for part in prefix {
            parent = self.find_or_create_package(parent, part);
        }

        match self.find_package(parent, last) {
            Some(existing) => self.absorb(package, existing)?,
            None if *last == name => self.attach(parent, package),
            None => {
                let created = self.create_package(*last);
                self.attach(parent, created);
                self.absorb(package, created)?;
            }
        }
        Ok(())
    }

    fn find_package(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.n(parent).children.iter().copied().find(|&child| {
            let child = self.n(child);
            child.metric() == Metric::Package && child.name == name
        })
    }

    fn find_or_create_package(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(existing) = self.find_package(parent, name) {
            return existing;
        }
        let created = self.create_package(name);
        self.attach(parent, created);
        created
    }

    /// Joins the detached `from` into `to` and drops `from` from the arena.
    ///
    /// Values present on both sides are combined with [`Value::max`]. Children
    /// with the same metric and name are joined recursively; the rest move
    /// over. Nothing is changed if a pair of values cannot be combined.
    fn absorb(&mut self, from: NodeId, to: NodeId) -> TreeResult<()> {
        self.check_absorb(from, to)?;
        self.absorb_unchecked(from, to)
    }

    fn check_absorb(&self, from: NodeId, to: NodeId) -> TreeResult<()> {
        for value in self.n(from).values() {
            if let Some(existing) = self.n(to).values.get(&value.metric()) {
                existing.max(value)?;
            }
        }
        for &child in &self.n(from).children {
            if let Some(twin) = self.find_twin(to, child) {
                self.check_absorb(child, twin)?;
            }
        }
        Ok(())
    }

    fn absorb_unchecked(&mut self, from: NodeId, to: NodeId) -> TreeResult<()> {
        debug!("joining {} into {}", self.n(from), self.n(to));
        let values: Vec<Value> = self.n(from).values().copied().collect();
        for value in values {
            let merged = match self.n(to).values.get(&value.metric()) {
                Some(existing) => existing.max(&value)?,
                None => value,
            };
            self.n_mut(to).values.insert(merged.metric(), merged);
        }

        let children = std::mem::take(&mut self.n_mut(from).children);
        for child in children {
            self.n_mut(child).parent = None;
            match self.find_twin(to, child) {
                Some(twin) => self.absorb_unchecked(child, twin)?,
                None => self.attach(to, child),
            }
        }

        let sources = std::mem::take(&mut self.n_mut(from).sources);
        self.n_mut(to).sources.extend(sources);
        self.discard(from);
        Ok(())
    }

    /// Child of `parent` with the metric and name of `node`.
    fn find_twin(&self, parent: NodeId, node: NodeId) -> Option<NodeId> {
        let node = self.n(node);
        self.n(parent).children.iter().copied().find(|&child| {
            let child = self.n(child);
            child.metric() == node.metric() && child.name == node.name
        })
    }
}
