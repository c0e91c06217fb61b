//! Tests for metric discovery and subtree aggregation

use std::collections::BTreeSet;

use covtree::domain::{
    strategy_for, AggregationStrategy, CoverageTree, Metric, NodeId, TreeError, Value,
};
use covtree::util::testing;
use rstest::{fixture, rstest};

struct Report {
    tree: CoverageTree,
    module: NodeId,
    covered_class: NodeId,
}

/// app
/// └── edu.hm
///     └── A.java
///         ├── A        LINE 8/10, BRANCH 2/4, COMPLEXITY 3
///         │   └── run  LINE 3/4
///         └── B        LINE 0/6, LOC 40
#[fixture]
fn report() -> Report {
    testing::init_test_setup();
    let mut tree = CoverageTree::new();
    let module = tree.create_module("app");
    let package = tree.create_package("edu.hm");
    let file = tree.create_file("A.java");
    let covered_class = tree.create_class("A");
    let method = tree.create_method("run", "()V", 12);
    let missed_class = tree.create_class("B");
    tree.add_child(module, package).unwrap();
    tree.add_child(package, file).unwrap();
    tree.add_all_children(file, &[covered_class, missed_class])
        .unwrap();
    tree.add_child(covered_class, method).unwrap();

    tree.add_all_values(
        covered_class,
        &[
            Value::coverage(Metric::Line, 8, 2),
            Value::coverage(Metric::Branch, 2, 2),
            Value::integer(Metric::Complexity, 3),
        ],
    )
    .unwrap();
    tree.add_value(method, Value::coverage(Metric::Line, 3, 1))
        .unwrap();
    tree.add_all_values(
        missed_class,
        &[
            Value::coverage(Metric::Line, 0, 6),
            Value::integer(Metric::Loc, 40),
        ],
    )
    .unwrap();

    Report {
        tree,
        module,
        covered_class,
    }
}

#[rstest]
fn given_report_when_metrics_then_kinds_and_value_metrics_are_sorted(report: Report) {
    let metrics = report.tree.get(report.module).unwrap().metrics();

    let expected: BTreeSet<Metric> = [
        Metric::Module,
        Metric::Package,
        Metric::File,
        Metric::Class,
        Metric::Method,
        Metric::Line,
        Metric::Branch,
        Metric::Complexity,
        Metric::Loc,
    ]
    .into_iter()
    .collect();
    assert_eq!(metrics, expected);
    assert_eq!(metrics.iter().next(), Some(&Metric::Module));
}

#[rstest]
fn given_subtree_when_metrics_then_only_subtree_is_considered(report: Report) {
    let metrics = report.tree.get(report.covered_class).unwrap().metrics();

    assert!(metrics.contains(&Metric::Class));
    assert!(metrics.contains(&Metric::Method));
    assert!(!metrics.contains(&Metric::Loc));
    assert!(!metrics.contains(&Metric::File));
}

#[rstest]
fn given_report_when_value_then_leaf_metrics_are_summed(report: Report) {
    let module = report.tree.get(report.module).unwrap();

    assert_eq!(
        module.value(Metric::Line),
        Some(Value::coverage(Metric::Line, 11, 9))
    );
    assert_eq!(
        module.value(Metric::Branch),
        Some(Value::coverage(Metric::Branch, 2, 2))
    );
    assert_eq!(
        module.value(Metric::Loc),
        Some(Value::integer(Metric::Loc, 40))
    );
    assert_eq!(module.value(Metric::Instruction), None);
}

#[rstest]
fn given_report_when_value_of_container_metric_then_nodes_are_counted(report: Report) {
    let module = report.tree.get(report.module).unwrap();

    assert_eq!(
        module.value(Metric::Class),
        Some(Value::coverage(Metric::Class, 1, 1))
    );
    assert_eq!(
        module.value(Metric::File),
        Some(Value::coverage(Metric::File, 1, 0))
    );
    assert_eq!(module.value(Metric::Container), None);
}

#[rstest]
fn given_report_when_distribution_then_every_metric_has_a_value(report: Report) {
    let module = report.tree.get(report.module).unwrap();

    let distribution = module.metrics_distribution().unwrap();

    assert_eq!(
        distribution.keys().copied().collect::<BTreeSet<_>>(),
        module.metrics()
    );
    assert_eq!(
        distribution[&Metric::Method],
        Value::coverage(Metric::Method, 1, 0)
    );
    assert_eq!(
        distribution[&Metric::Complexity],
        Value::integer(Metric::Complexity, 3)
    );
}

#[rstest]
fn given_node_without_values_when_distribution_then_own_kind_is_counted_as_missed() {
    let mut tree = CoverageTree::new();
    let module = tree.create_module("empty");

    let distribution = tree.get(module).unwrap().metrics_distribution().unwrap();

    assert_eq!(distribution.len(), 1);
    assert_eq!(
        distribution[&Metric::Module],
        Value::coverage(Metric::Module, 0, 1)
    );
}

#[rstest]
#[case(Metric::Module, AggregationStrategy::CountNodes)]
#[case(Metric::Method, AggregationStrategy::CountNodes)]
#[case(Metric::Line, AggregationStrategy::SumValues)]
#[case(Metric::Complexity, AggregationStrategy::SumValues)]
fn given_metric_when_strategy_looked_up_then_matches_kind(
    #[case] metric: Metric,
    #[case] expected: AggregationStrategy,
) {
    assert_eq!(strategy_for(metric), expected);
}

#[test]
fn given_sum_beyond_u64_when_value_then_none_instead_of_panic() {
    testing::init_test_setup();
    let mut tree = CoverageTree::new();
    let package = tree.create_package("big");
    let half = u64::MAX / 2 + 1;
    for name in ["A.java", "B.java"] {
        let file = tree.create_file(name);
        tree.add_child(package, file).unwrap();
        tree.add_value(file, Value::coverage(Metric::Line, half, 0))
            .unwrap();
    }

    let package = tree.get(package).unwrap();

    assert_eq!(package.value(Metric::Line), None);
    assert!(matches!(
        package.metrics_distribution(),
        Err(TreeError::MissingValue {
            metric: Metric::Line,
            ..
        })
    ));
}

#[rstest]
#[case(Metric::Package)]
#[case(Metric::Method)]
fn given_container_metric_value_when_added_then_rejected(#[case] metric: Metric) {
    let mut tree = CoverageTree::new();
    let module = tree.create_module("app");

    let result = tree.add_value(module, Value::coverage(metric, 1, 0));

    assert!(matches!(result, Err(TreeError::InvalidValue { .. })));
    let module = tree.get(module).unwrap();
    assert_eq!(module.values().count(), 0);
    assert_eq!(module.metrics_distribution().unwrap().len(), 1);
}
