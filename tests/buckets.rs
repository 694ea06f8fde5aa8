use std::collections::HashMap;

use dtree::{NodeRecord, Request, ResolveOptions, Tree};

const TRIALS: usize = 4_000;

fn tally(tree: &Tree, request: impl Fn(usize) -> Request) -> HashMap<String, usize> {
    let options = ResolveOptions::new();
    let mut counts = HashMap::new();
    for i in 0..TRIALS {
        let res = tree.resolve(&request(i), &options);
        let name = res.node().name().unwrap_or("?").to_owned();
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

fn roughly_half(count: usize) -> bool {
    // 4000 fair trials: five standard deviations is ~160.
    (TRIALS / 2).abs_diff(count) < 250
}

#[test]
fn percent_split_is_roughly_even() {
    let tree = Tree::from_records(vec![
        NodeRecord::new(1, 0).name("root"),
        NodeRecord::new(2, 1).operator("percent").value(50_i64).name("A"),
        NodeRecord::new(3, 1).operator("%").value(50_i64).name("B"),
    ])
    .unwrap();

    let counts = tally(&tree, |_| Request::new());
    assert_eq!(counts.get("root"), None);
    assert!(roughly_half(counts["A"]), "A selected {} times", counts["A"]);
    assert!(roughly_half(counts["B"]), "B selected {} times", counts["B"]);
}

#[test]
fn partial_coverage_without_fallback_often_yields_nothing() {
    let tree = Tree::from_records(vec![
        NodeRecord::new(1, 0).name("root"),
        NodeRecord::new(2, 1).operator("percent").value(50_i64).name("half"),
        NodeRecord::new(3, 1).when("never", "eq", true).name("other"),
    ])
    .unwrap();

    let counts = tally(&tree, |_| Request::new().set("never", false));
    assert!(roughly_half(counts["half"]), "half selected {} times", counts["half"]);
    assert!(roughly_half(counts["root"]), "root reached {} times", counts["root"]);
    assert_eq!(counts.get("other"), None);
}

#[test]
fn uncovered_share_goes_to_fallback() {
    let tree = Tree::from_records(vec![
        NodeRecord::new(1, 0).name("root"),
        NodeRecord::new(2, 1).operator("percent").value(10_i64).name("canary"),
        NodeRecord::new(3, 1).value("fallback").name("stable"),
    ])
    .unwrap();

    let counts = tally(&tree, |_| Request::new());
    assert_eq!(counts.get("root"), None);
    assert!(counts["stable"] > counts.get("canary").copied().unwrap_or(0));
}

fn ab_tree() -> Tree {
    Tree::from_records(vec![
        NodeRecord::new(1, 0).name("root"),
        NodeRecord::new(2, 1)
            .when("user_id", "ab", 50_i64)
            .name("control"),
        NodeRecord::new(3, 1)
            .when("user_id", "ab", 50_i64)
            .name("variant"),
    ])
    .unwrap()
}

fn bucket_of(tree: &Tree, user: &str) -> String {
    let res = tree.resolve(&Request::new().set("user_id", user), &ResolveOptions::new());
    res.node().name().unwrap_or("?").to_owned()
}

#[test]
fn ab_is_stable_per_key() {
    let tree = ab_tree();
    let first = bucket_of(&tree, "entity1");
    for _ in 0..100 {
        assert_eq!(bucket_of(&tree, "entity1"), first);
    }
}

#[test]
fn ab_separates_distinct_keys() {
    let tree = ab_tree();
    assert_eq!(bucket_of(&tree, "user-2"), "control");
    assert_eq!(bucket_of(&tree, "user-1"), "variant");
}

#[test]
fn ab_numeric_key_is_stable() {
    let tree = ab_tree();
    let bucket = |id: i64| {
        tree.resolve(&Request::new().set("user_id", id), &ResolveOptions::new())
            .node()
            .id()
    };
    let first = bucket(42);
    assert!((0..50).all(|_| bucket(42) == first));
}

#[test]
fn ab_split_distributes_keys_evenly() {
    let tree = ab_tree();
    let control = (0..1_000)
        .filter(|i| bucket_of(&tree, &format!("user-{i}")) == "control")
        .count();
    assert!((400..600).contains(&control), "control received {control} keys");
}
