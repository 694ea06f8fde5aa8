//! Proportional selection among a sibling group.
//!
//! Each bucket sibling declares a weight in its `value`. A point in `[0, 100)`
//! is drawn and the first sibling whose running weight total reaches the point
//! is selected. `percent` draws the point at random on every evaluation; `ab`
//! derives it from a CRC-32 of the request's identifying key, so the same key
//! always lands in the same bucket.

use std::borrow::Cow;
use std::fmt;

use rand::Rng;

use crate::types::{CompareError, Node, NodeId, Tree, Value};

const AB_SALT: &str = "dtree-ab";
const AB_RESOLUTION: u32 = 10_000;

/// Built-in bucket operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketOp {
    /// Random proportional bucketing (`percent` / `%`).
    Percent,
    /// Stable bucketing keyed by an identifying request field (`ab`).
    AbTest,
}

impl BucketOp {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "percent" | "%" => Some(BucketOp::Percent),
            "ab" => Some(BucketOp::AbTest),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BucketOp::Percent => "percent",
            BucketOp::AbTest => "ab",
        }
    }

    fn owns(self, operator: &str) -> bool {
        Self::from_name(operator) == Some(self)
    }
}

impl fmt::Display for BucketOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn percentage(tree: &Tree, node: &Node) -> Result<Option<NodeId>, CompareError> {
    select(tree, node, BucketOp::Percent, random_point)
}

pub(crate) fn ab_test(request: &Value, tree: &Tree, node: &Node) -> Result<Option<NodeId>, CompareError> {
    let stable = identity(request).map(|key| stable_point(&key));
    select(tree, node, BucketOp::AbTest, || stable.unwrap_or_else(random_point))
}

fn select(
    tree: &Tree,
    node: &Node,
    op: BucketOp,
    draw: impl FnOnce() -> f64,
) -> Result<Option<NodeId>, CompareError> {
    let parent = node
        .parent()
        .ok_or(CompareError::NoParentNode { id: node.id() })?;
    let siblings = tree.get(parent).ok_or(CompareError::NoNode)?.children();

    if let [only] = siblings {
        return Ok(Some(*only));
    }

    let point = draw();
    let picked = pick(tree, siblings, op, point);
    tracing::trace!(operator = %op, point, picked = ?picked.map(NodeId::index), "bucket draw");
    Ok(picked)
}

/// Walk `siblings` accumulating the weights of `op` buckets; the first bucket
/// whose inclusive running total reaches `point` wins. Falls back to the last
/// fallback sibling seen, if any.
fn pick(tree: &Tree, siblings: &[NodeId], op: BucketOp, point: f64) -> Option<NodeId> {
    let mut total = 0.0;
    let mut fallback = None;

    for &id in siblings {
        let Some(sibling) = tree.get(id) else {
            continue;
        };
        if op.owns(sibling.operator()) {
            if let Some(weight) = sibling.value().as_f64() {
                total += weight;
                if point <= total {
                    return Some(id);
                }
            }
        }
        if tree.is_fallback(sibling) {
            fallback = Some(id);
        }
    }

    fallback
}

fn random_point() -> f64 {
    rand::thread_rng().gen_range(0.0..100.0)
}

/// Identifying key for stable bucketing. Empty or non-scalar values have none.
fn identity(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) if !s.is_empty() => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn stable_point(key: &str) -> f64 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(AB_SALT.as_bytes());
    hasher.update(key.as_bytes());
    f64::from(hasher.finalize() % AB_RESOLUTION) / 100.0
}
