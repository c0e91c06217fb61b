//! Measurement values attached to nodes.

use std::fmt;

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::metric::Metric;

/// Covered/missed counts for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coverage {
    pub metric: Metric,
    pub covered: u64,
    pub missed: u64,
}

impl Coverage {
    pub fn new(metric: Metric, covered: u64, missed: u64) -> Self {
        Self {
            metric,
            covered,
            missed,
        }
    }

    pub fn total(&self) -> u64 {
        self.covered.saturating_add(self.missed)
    }

    /// Covered share in `[0, 1]`, `None` when nothing was measured.
    pub fn ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.covered as f64 / total as f64),
        }
    }
}

/// A measurement for exactly one metric.
///
/// Values are small and `Copy`, so copies of a tree carry equal values
/// instead of shared references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Coverage(Coverage),
    Integer { metric: Metric, value: u64 },
}

impl Value {
    pub fn coverage(metric: Metric, covered: u64, missed: u64) -> Self {
        Value::Coverage(Coverage::new(metric, covered, missed))
    }

    pub fn integer(metric: Metric, value: u64) -> Self {
        Value::Integer { metric, value }
    }

    pub fn metric(&self) -> Metric {
        match self {
            Value::Coverage(coverage) => coverage.metric,
            Value::Integer { metric, .. } => *metric,
        }
    }

    /// Checks that the metric can be stored on a node and that the variant
    /// fits it (integers for complexity and lines of code, coverage for the
    /// other leaf metrics).
    pub fn validate(&self) -> TreeResult<()> {
        let metric = self.metric();
        if metric.is_container() {
            return Err(TreeError::InvalidValue {
                metric,
                reason: "container metrics are counted from the tree".to_string(),
            });
        }
        match (self, metric.is_integer()) {
            (Value::Coverage(_), false) | (Value::Integer { .. }, true) => Ok(()),
            (Value::Coverage(_), true) => Err(TreeError::InvalidValue {
                metric,
                reason: "expected an integer value".to_string(),
            }),
            (Value::Integer { .. }, false) => Err(TreeError::InvalidValue {
                metric,
                reason: "expected a coverage value".to_string(),
            }),
        }
    }

    /// Merge rule for two measurements of the same subject.
    ///
    /// Coverage keeps the operand with more covered items, the left one on a
    /// tie. Integers keep the larger value.
    pub fn max(&self, other: &Value) -> TreeResult<Value> {
        match (self, other) {
            (Value::Coverage(left), Value::Coverage(right)) if left.metric == right.metric => {
                if right.covered > left.covered {
                    Ok(*other)
                } else {
                    Ok(*self)
                }
            }
            (
                Value::Integer {
                    metric: left_metric,
                    value: left,
                },
                Value::Integer {
                    metric: right_metric,
                    value: right,
                },
            ) if left_metric == right_metric => Ok(if right > left { *other } else { *self }),
            _ => Err(self.incompatible(other)),
        }
    }

    /// Sums two measurements of the same metric.
    pub fn add(&self, other: &Value) -> TreeResult<Value> {
        let overflow = || TreeError::ValueOverflow {
            metric: self.metric(),
        };
        match (self, other) {
            (Value::Coverage(left), Value::Coverage(right)) if left.metric == right.metric => {
                Ok(Value::coverage(
                    left.metric,
                    left.covered.checked_add(right.covered).ok_or_else(overflow)?,
                    left.missed.checked_add(right.missed).ok_or_else(overflow)?,
                ))
            }
            (
                Value::Integer {
                    metric: left_metric,
                    value: left,
                },
                Value::Integer {
                    metric: right_metric,
                    value: right,
                },
            ) if left_metric == right_metric => left
                .checked_add(*right)
                .map(|sum| Value::integer(*left_metric, sum))
                .ok_or_else(overflow),
            _ => Err(self.incompatible(other)),
        }
    }

    fn incompatible(&self, other: &Value) -> TreeError {
        TreeError::IncompatibleValues {
            left: self.to_string(),
            right: other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Coverage(coverage) => write!(
                f,
                "{}: {}/{}",
                coverage.metric,
                coverage.covered,
                coverage.total()
            ),
            Value::Integer { metric, value } => write!(f, "{}: {}", metric, value),
        }
    }
}
