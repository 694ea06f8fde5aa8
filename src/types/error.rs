use thiserror::Error;

/// Errors raised while evaluating a node against a request.
///
/// A comparator that simply does not match is not an error; it yields
/// `Ok(false)` or `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("operator '{operator}' cannot compare a {request} request value with a {reference} node value")]
    TypeMismatch {
        operator: &'static str,
        request: &'static str,
        reference: &'static str,
    },

    #[error("operator '{operator}' does not support {kind} request values")]
    UnsupportedType {
        operator: &'static str,
        kind: &'static str,
    },

    #[error("node is missing from the tree")]
    NoNode,

    #[error("node {id} has no parent")]
    NoParentNode { id: i64 },
}

/// Errors produced while linking flat records into a [`Tree`](crate::Tree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no root record found; exactly one record must have parent_id 0")]
    MissingRoot,

    #[error("parent node index {index} is not in the tree")]
    UnknownParent { index: usize },
}
