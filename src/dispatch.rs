use std::fmt;

use crate::bucket::{self, BucketOp};
use crate::compare::{self, CompareOp};
use crate::types::{CompareError, Node, NodeId, Request, ResolveOptions, Tree, Value};

/// A built-in operator: a value comparator or a sibling bucket selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Compare(CompareOp),
    Bucket(BucketOp),
}

impl Operator {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        CompareOp::from_name(name)
            .map(Operator::Compare)
            .or_else(|| BucketOp::from_name(name).map(Operator::Bucket))
    }

    /// Whether `name` is one of the built-in operator spellings.
    #[must_use]
    pub fn is_builtin(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Compare(op) => write!(f, "{op}"),
            Operator::Bucket(op) => write!(f, "{op}"),
        }
    }
}

/// Evaluate `node` against the request.
///
/// Fallback nodes and nodes without an operator match unconditionally.
/// Registered operators are consulted first when overriding is enabled or
/// the name is not built in.
pub(crate) fn dispatch(
    tree: &Tree,
    request: &Request,
    request_value: &Value,
    node: &Node,
    options: &ResolveOptions,
) -> Result<Option<NodeId>, CompareError> {
    if tree.is_fallback(node) || node.operator().is_empty() {
        return Ok(Some(node.index()));
    }

    let name = node.operator();
    let builtin = Operator::from_name(name);

    if options.override_existing_operator || builtin.is_none() {
        if let Some(custom) = options.custom(name) {
            return custom(request, tree, node);
        }
    } else if options.has_operator(name) {
        tracing::warn!(
            operator = name,
            node = node.id(),
            "registered operator is shadowed by the built-in; enable override_existing_operator to use it"
        );
    }

    match builtin {
        Some(Operator::Compare(op)) => {
            Ok(compare::evaluate(op, request_value, node)?.then_some(node.index()))
        }
        Some(Operator::Bucket(BucketOp::Percent)) => bucket::percentage(tree, node),
        Some(Operator::Bucket(BucketOp::AbTest)) => bucket::ab_test(request_value, tree, node),
        None => Err(CompareError::UnknownOperator {
            operator: name.to_owned(),
        }),
    }
}
