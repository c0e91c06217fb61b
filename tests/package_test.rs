//! Tests for splitting dotted package nodes

use covtree::domain::{CoverageTree, Metric, TreeError, Value};
use covtree::util::testing;
use rstest::rstest;

fn package_names(tree: &CoverageTree) -> Vec<String> {
    let mut names: Vec<String> = tree
        .root()
        .unwrap()
        .get_all(Metric::Package)
        .unwrap()
        .iter()
        .map(|n| n.name().to_string())
        .collect();
    names.sort();
    names
}

#[rstest]
#[case::prefix_first(&["left", "left.right"])]
#[case::prefix_last(&["left.right", "left"])]
fn given_dotted_packages_when_split_then_nested(#[case] packages: &[&str]) {
    testing::init_test_setup();
    let mut tree = CoverageTree::new();
    let root = tree.create_module("root");
    for name in packages {
        let package = tree.create_package(*name);
        tree.add_child(root, package).unwrap();
    }
    assert_eq!(package_names(&tree), vec!["left", "left.right"]);

    tree.split_packages(root).unwrap();

    assert_eq!(package_names(&tree), vec!["left", "right"]);
    let module = tree.get(root).unwrap();
    assert_eq!(module.child_ids().len(), 1);
    let right = module.find(Metric::Package, "right").unwrap();
    assert_eq!(right.parent().unwrap().name(), "left");
    assert_eq!(right.path(), "left/right");
    // nothing but the module is left without a parent
    assert_eq!(tree.roots().count(), 1);
}

#[test]
fn given_split_package_with_content_when_split_then_content_moves_to_innermost() {
    let mut tree = CoverageTree::new();
    let root = tree.create_module("root");
    let package = tree.create_package("edu.hm.hafner");
    let file = tree.create_file("Ensure.java");
    tree.add_child(root, package).unwrap();
    tree.add_child(package, file).unwrap();
    tree.add_value(package, Value::coverage(Metric::Line, 2, 3))
        .unwrap();
    tree.add_source(package, "src/main/java").unwrap();

    tree.split_packages(root).unwrap();

    let module = tree.get(root).unwrap();
    let hafner = module.find(Metric::Package, "hafner").unwrap();
    assert_eq!(hafner.parent_name(), "edu.hm");
    assert_eq!(
        hafner.own_value(Metric::Line),
        Some(&Value::coverage(Metric::Line, 2, 3))
    );
    assert_eq!(hafner.sources(), ["src/main/java"]);
    let file = module.find(Metric::File, "Ensure.java").unwrap();
    assert_eq!(file.parent().unwrap().id(), hafner.id());
    assert_eq!(file.path(), "edu/hm/hafner/Ensure.java");
    assert!(matches!(tree.get(package), Err(TreeError::UnknownNode(_))));
}

#[test]
fn given_plain_packages_when_split_then_unchanged() {
    let mut tree = CoverageTree::new();
    let root = tree.create_module("root");
    let a = tree.create_package("a");
    let b = tree.create_package("b");
    tree.add_all_children(root, &[a, b]).unwrap();
    let before = tree.get(root).unwrap().to_tree();

    tree.split_packages(root).unwrap();

    assert_eq!(tree.get(root).unwrap(), before.root().unwrap());
}

#[test]
fn given_non_package_children_when_split_then_kept_in_place() {
    let mut tree = CoverageTree::new();
    let root = tree.create_module("root");
    let file = tree.create_file("build.gradle");
    let package = tree.create_package("a.b");
    tree.add_all_children(root, &[file, package]).unwrap();

    tree.split_packages(root).unwrap();

    let module = tree.get(root).unwrap();
    let names: Vec<&str> = module.children().map(|c| c.node().name()).collect();
    assert_eq!(names, vec!["build.gradle", "a"]);
}

#[test]
fn given_dotted_package_colliding_with_nested_package_when_split_then_joined() {
    testing::init_test_setup();
    let mut tree = CoverageTree::new();
    let root = tree.create_module("root");
    let a = tree.create_package("a");
    let b = tree.create_package("b");
    let dotted = tree.create_package("a.b");
    let nested_file = tree.create_file("Y.java");
    let dotted_file = tree.create_file("X.java");
    let dotted_twin = tree.create_file("Y.java");
    tree.add_all_children(root, &[a, dotted]).unwrap();
    tree.add_child(a, b).unwrap();
    tree.add_child(b, nested_file).unwrap();
    tree.add_all_children(dotted, &[dotted_file, dotted_twin])
        .unwrap();
    tree.add_value(b, Value::coverage(Metric::Line, 1, 2))
        .unwrap();
    tree.add_value(dotted, Value::coverage(Metric::Line, 3, 4))
        .unwrap();
    tree.add_value(nested_file, Value::coverage(Metric::Branch, 1, 0))
        .unwrap();
    tree.add_value(dotted_twin, Value::coverage(Metric::Branch, 0, 1))
        .unwrap();
    tree.add_source(dotted, "src/main/java").unwrap();
    assert_eq!(tree.len(), 7);

    tree.split_packages(root).unwrap();

    assert_eq!(tree.roots().count(), 1);
    assert_eq!(tree.len(), 5);
    let module = tree.get(root).unwrap();
    assert_eq!(package_names(&tree), vec!["a", "b"]);
    let b = module.find(Metric::Package, "b").unwrap();
    assert!(tree.get(a).unwrap().child_ids().contains(&b.id()));
    assert_eq!(b.parent().unwrap().name(), "a");
    assert_eq!(
        b.own_value(Metric::Line),
        Some(&Value::coverage(Metric::Line, 3, 4))
    );
    assert_eq!(b.sources(), ["src/main/java"]);
    let files: Vec<&str> = b.children().map(|c| c.node().name()).collect();
    assert_eq!(files, vec!["Y.java", "X.java"]);
    let joined = b.find(Metric::File, "Y.java").unwrap();
    assert_eq!(
        joined.own_value(Metric::Branch),
        Some(&Value::coverage(Metric::Branch, 1, 0))
    );
    assert_eq!(joined.path(), "a/b/Y.java");
    assert!(matches!(tree.get(dotted), Err(TreeError::UnknownNode(_))));
    assert!(matches!(tree.get(dotted_twin), Err(TreeError::UnknownNode(_))));
}
