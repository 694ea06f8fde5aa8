use crate::dispatch::dispatch;
use crate::types::{
    CompareError, Node, Request, Resolution, ResolveOptions, Trail, TrailEntry, Tree, Value,
};

/// Walk the tree from the root, descending into the first child that matches
/// the request, until a node has no matching child.
pub(crate) fn resolve<'t>(
    tree: &'t Tree,
    request: &Request,
    options: &ResolveOptions,
    mut trail: Option<&mut Trail>,
) -> Resolution<'t> {
    let mut current = tree.root();

    'descend: loop {
        for child in tree.children(current.index()) {
            let request_value = request.value_of(child.key());
            tracing::trace!(child = child.id(), operator = child.operator(), "evaluating child");
            let outcome = dispatch(tree, request, request_value, child, options).and_then(|picked| {
                picked
                    .map(|id| tree.get(id).ok_or(CompareError::NoNode))
                    .transpose()
            });

            match outcome {
                Ok(Some(next)) => {
                    if let Some(trail) = trail.as_deref_mut() {
                        trail.record(entry(next, request_value.clone()));
                    }
                    tracing::debug!(from = current.id(), to = next.id(), "descend");
                    current = next;
                    continue 'descend;
                }
                Ok(None) => {}
                Err(err) if options.stop_if_converting_error => {
                    tracing::debug!(
                        node = current.id(),
                        child = child.id(),
                        error = %err,
                        "resolution halted"
                    );
                    return Resolution::halted(current, err);
                }
                Err(err) => {
                    tracing::trace!(child = child.id(), error = %err, "skipping child");
                }
            }
        }

        tracing::debug!(node = current.id(), "resolved");
        return Resolution::complete(current);
    }
}

fn entry(node: &Node, request_value: Value) -> TrailEntry {
    TrailEntry {
        node_id: node.id(),
        key: node.key().to_owned(),
        request_value,
        operator: node.operator().to_owned(),
        node_value: node.value().clone(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{CompareError, NodeRecord, Request, ResolveOptions, Trail, Tree, Value};

    fn test_tree() -> Tree {
        Tree::from_records(vec![
            NodeRecord::new(1, 0).name("root"),
            NodeRecord::new(2, 1).when("isTest", "eq", false),
            NodeRecord::new(3, 2).name("Never Reach").value("fallback"),
            NodeRecord::new(4, 1).when("isTest", "eq", true),
            NodeRecord::new(5, 4).when("count", "gt", 10_i64).order(1),
            NodeRecord::new(6, 5).name("FinalNode 2").value("fallback"),
            NodeRecord::new(7, 4).when("count", "lt", 10_i64).order(2),
            NodeRecord::new(8, 7).name("FinalNode 1").value("fallback"),
            NodeRecord::new(9, 4).name("FinalNode 3").value("fallback"),
        ])
        .unwrap()
    }

    #[test]
    fn resolves_to_leaf() {
        let tree = test_tree();
        let request = Request::new().set("isTest", true).set("count", 15_i64);
        let res = tree.resolve(&request, &ResolveOptions::new());
        assert!(!res.is_halted());
        assert_eq!(res.node().name(), Some("FinalNode 2"));
    }

    #[test]
    fn stops_at_parent_on_error_when_configured() {
        let tree = test_tree();
        let request = Request::new().set("isTest", true).set("count", "15");
        let options = ResolveOptions::new().stop_if_converting_error(true);
        let res = tree.resolve(&request, &options);
        assert!(matches!(res.error(), Some(CompareError::TypeMismatch { .. })));
        assert_eq!(res.node().key(), "isTest");
        assert_eq!(res.node().id(), 4);
    }

    #[test]
    fn skips_erroring_children_by_default() {
        let tree = test_tree();
        let request = Request::new().set("isTest", true).set("count", "15");
        let res = tree.resolve(&request, &ResolveOptions::new());
        assert!(!res.is_halted());
        assert_eq!(res.node().name(), Some("FinalNode 3"));
    }

    #[test]
    fn no_matching_child_stops_at_current() {
        let tree = Tree::from_records(vec![
            NodeRecord::new(1, 0).name("root"),
            NodeRecord::new(2, 1).when("x", "eq", 1_i64),
        ])
        .unwrap();
        let res = tree.resolve(&Request::new().set("x", 2_i64), &ResolveOptions::new());
        assert_eq!(res.node().name(), Some("root"));
        assert!(!res.is_halted());
    }

    #[test]
    fn root_without_children_resolves_to_root() {
        let tree = Tree::new(NodeRecord::new(1, 0).name("alone"));
        let res = tree.resolve(&Request::new(), &ResolveOptions::new());
        assert_eq!(res.node().name(), Some("alone"));
    }

    #[test]
    fn trail_records_each_descent() {
        let tree = test_tree();
        let request = Request::new().set("isTest", true).set("count", 5_i64);
        let mut trail = Trail::new();
        let res = tree.resolve_traced(&request, &ResolveOptions::new(), &mut trail);
        assert_eq!(res.node().name(), Some("FinalNode 1"));
        assert_eq!(
            trail.descriptions(),
            vec![
                "4 : isTest true eq true",
                "7 : count 5 lt 10",
                "8 :  null  \"fallback\"",
            ]
        );
        assert_eq!(trail.entries()[1].request_value, Value::from(5_i64));
    }

    #[test]
    fn custom_operator_returning_foreign_node_is_no_node() {
        let tree = Tree::from_records(vec![
            NodeRecord::new(1, 0).name("root"),
            NodeRecord::new(2, 1).operator("wild"),
        ])
        .unwrap();
        let options = ResolveOptions::new()
            .stop_if_converting_error(true)
            .operator("wild", |_, _, _| Ok(Some(crate::NodeId(999))));
        let res = tree.resolve(&request_any(), &options);
        assert_eq!(res.error(), Some(&CompareError::NoNode));
        assert_eq!(res.node().name(), Some("root"));
    }

    #[test]
    fn custom_operator_can_select_a_sibling() {
        let tree = Tree::from_records(vec![
            NodeRecord::new(1, 0).name("root"),
            NodeRecord::new(2, 1).name("picker").operator("pick-last"),
            NodeRecord::new(3, 1).name("target").when("never", "eq", true),
        ])
        .unwrap();
        let options = ResolveOptions::new().operator("pick-last", |_, tree, node| {
            Ok(node
                .parent()
                .and_then(|p| tree.get(p))
                .and_then(|p| p.children().last().copied()))
        });
        let res = tree.resolve(&request_any(), &options);
        assert_eq!(res.node().name(), Some("target"));
    }

    fn request_any() -> Request {
        Request::new().set("any", 1_i64)
    }
}
