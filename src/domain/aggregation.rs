//! Metric discovery and subtree aggregation.
//!
//! How a metric is aggregated is looked up in [`strategy_for`], so the tree
//! itself never needs to know numeric details.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{instrument, trace, warn};

use crate::domain::arena::NodeRef;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::metric::Metric;
use crate::domain::value::Value;

/// Rule for computing a metric over a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationStrategy {
    /// Count nodes of the metric's kind; a node counts as covered when its own
    /// subtree has at least one covered line.
    CountNodes,
    /// Sum all values of the metric stored in the subtree.
    SumValues,
}

pub fn strategy_for(metric: Metric) -> AggregationStrategy {
    match metric {
        Metric::Container
        | Metric::Module
        | Metric::Package
        | Metric::File
        | Metric::Class
        | Metric::Method => AggregationStrategy::CountNodes,
        Metric::Line
        | Metric::Branch
        | Metric::Instruction
        | Metric::Mutation
        | Metric::Complexity
        | Metric::Loc => AggregationStrategy::SumValues,
    }
}

fn count_nodes(node: &NodeRef<'_>, metric: Metric) -> Option<Value> {
    let (covered, missed) = node
        .iter()
        .filter(|candidate| candidate.metric() == metric)
        .fold((0, 0), |(covered, missed), candidate| {
            let has_covered_lines = matches!(
                sum_values(&candidate, Metric::Line),
                Some(Value::Coverage(coverage)) if coverage.covered > 0
            );
            if has_covered_lines {
                (covered + 1, missed)
            } else {
                (covered, missed + 1)
            }
        });
    match covered + missed {
        0 => None,
        _ => Some(Value::coverage(metric, covered, missed)),
    }
}

fn sum_values(node: &NodeRef<'_>, metric: Metric) -> Option<Value> {
    node.iter()
        .filter_map(|candidate| candidate.node().own_value(metric).copied())
        .try_fold(None, |sum: Option<Value>, value| match sum {
            None => Some(Some(value)),
            Some(total) => match total.add(&value) {
                Ok(sum) => Some(Some(sum)),
                Err(err) => {
                    warn!(%err, "cannot aggregate {}", node);
                    None
                }
            },
        })
        .flatten()
}

impl<'a> NodeRef<'a> {
    /// Returns the metrics present in the subtree: node kinds and value
    /// metrics, ordered.
    #[instrument(level = "trace", skip(self), fields(node = %self))]
    pub fn metrics(&self) -> BTreeSet<Metric> {
        self.iter()
            .flat_map(|node| {
                let node = node.node();
                std::iter::once(node.metric()).chain(node.values.keys().copied())
            })
            .collect()
    }

    /// Aggregated value for every metric of [`NodeRef::metrics`].
    ///
    /// A discovered metric without an aggregated value is an internal
    /// inconsistency and reported as [`TreeError::MissingValue`].
    pub fn metrics_distribution(&self) -> TreeResult<BTreeMap<Metric, Value>> {
        self.metrics()
            .into_iter()
            .map(|metric| {
                self.value(metric)
                    .map(|value| (metric, value))
                    .ok_or_else(|| TreeError::MissingValue {
                        node: self.to_string(),
                        metric,
                    })
            })
            .collect()
    }

    /// Value of `metric` aggregated over the subtree rooted here, `None` when
    /// nothing was measured or the sum does not fit into 64 bits.
    pub fn value(&self, metric: Metric) -> Option<Value> {
        let value = match strategy_for(metric) {
            AggregationStrategy::CountNodes => count_nodes(self, metric),
            AggregationStrategy::SumValues => sum_values(self, metric),
        };
        trace!(%metric, ?value, "aggregated");
        value
    }
}
