use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use crate::types::{CompareError, Node, Value};

/// Built-in comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    Count,
    Regexp,
}

impl CompareOp {
    /// Parse an operator name. Both spellings are accepted (`eq` / `==`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "eq" | "==" => CompareOp::Eq,
            "ne" | "!=" => CompareOp::Ne,
            "gt" | ">" => CompareOp::Gt,
            "lt" | "<" => CompareOp::Lt,
            "gte" | ">=" => CompareOp::Gte,
            "lte" | "<=" => CompareOp::Lte,
            "contains" => CompareOp::Contains,
            "count" => CompareOp::Count,
            "regexp" => CompareOp::Regexp,
            _ => return None,
        })
    }

    /// Canonical name, as used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Lt => "lt",
            CompareOp::Gte => "gte",
            CompareOp::Lte => "lte",
            CompareOp::Contains => "contains",
            CompareOp::Count => "count",
            CompareOp::Regexp => "regexp",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply `op` to a request value and a raw reference operand.
pub(crate) fn apply(op: CompareOp, request: &Value, reference: &Value) -> Result<bool, CompareError> {
    match op {
        CompareOp::Eq => eq(request, reference),
        // An error from eq passes through untouched.
        CompareOp::Ne => eq(request, reference).map(|matched| !matched),
        CompareOp::Gt => ordered(op, request, reference, Ordering::is_gt),
        CompareOp::Lt => ordered(op, request, reference, Ordering::is_lt),
        CompareOp::Gte => ordered(op, request, reference, Ordering::is_ge),
        CompareOp::Lte => ordered(op, request, reference, Ordering::is_le),
        CompareOp::Contains => contains(request, reference),
        CompareOp::Count => count(request, reference),
        CompareOp::Regexp => regexp(request, reference, |subject, pattern| {
            Regex::new(pattern).is_ok_and(|re| re.is_match(subject))
        }),
    }
}

/// Apply `op` against a node's value, reusing the node's compiled pattern.
pub(crate) fn evaluate(op: CompareOp, request: &Value, node: &Node) -> Result<bool, CompareError> {
    match op {
        CompareOp::Regexp => regexp(request, node.value(), |subject, _| {
            node.pattern().is_some_and(|re| re.is_match(subject))
        }),
        _ => apply(op, request, node.value()),
    }
}

fn mismatch(op: CompareOp, request: &Value, reference: &Value) -> CompareError {
    CompareError::TypeMismatch {
        operator: op.name(),
        request: request.kind(),
        reference: reference.kind(),
    }
}

fn unsupported(op: CompareOp, request: &Value) -> CompareError {
    CompareError::UnsupportedType {
        operator: op.name(),
        kind: request.kind(),
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

fn eq(request: &Value, reference: &Value) -> Result<bool, CompareError> {
    match request {
        Value::Number(a) => match reference {
            Value::Number(b) => Ok(a == b),
            Value::List(items) => Ok(items.iter().any(|v| v.as_f64() == Some(*a))),
            _ => Err(mismatch(CompareOp::Eq, request, reference)),
        },
        Value::String(a) => match reference {
            Value::String(b) => Ok(eq_ignore_case(a, b)),
            Value::List(items) => Ok(items
                .iter()
                .filter_map(Value::as_str)
                .any(|b| eq_ignore_case(a, b))),
            _ => Err(mismatch(CompareOp::Eq, request, reference)),
        },
        Value::Bool(a) => match reference {
            Value::Bool(b) => Ok(a == b),
            _ => Err(mismatch(CompareOp::Eq, request, reference)),
        },
        // Any number or string element matching is enough; other elements
        // and incompatible pairings are skipped rather than raised.
        Value::List(items) => Ok(items.iter().any(|item| {
            matches!(item, Value::Number(_) | Value::String(_))
                && eq(item, reference).unwrap_or(false)
        })),
        Value::Null | Value::Object(_) => Err(unsupported(CompareOp::Eq, request)),
    }
}

fn ordered(
    op: CompareOp,
    request: &Value,
    reference: &Value,
    accept: fn(Ordering) -> bool,
) -> Result<bool, CompareError> {
    let ordering = match (request, reference) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(_) | Value::String(_), _) => return Err(mismatch(op, request, reference)),
        _ => return Err(unsupported(op, request)),
    };
    // NaN has no ordering and never matches.
    Ok(ordering.is_some_and(accept))
}

fn contains(request: &Value, reference: &Value) -> Result<bool, CompareError> {
    match (request, reference) {
        (Value::String(haystack), Value::String(needle)) => Ok(haystack.contains(needle.as_str())),
        (Value::String(_), _) => Err(mismatch(CompareOp::Contains, request, reference)),
        _ => Err(unsupported(CompareOp::Contains, request)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn count(request: &Value, reference: &Value) -> Result<bool, CompareError> {
    match (request, reference) {
        (Value::List(items), Value::Number(n)) => {
            Ok(n.is_finite() && items.len() as f64 == n.trunc())
        }
        (Value::List(_), _) => Err(mismatch(CompareOp::Count, request, reference)),
        _ => Err(unsupported(CompareOp::Count, request)),
    }
}

fn regexp(
    request: &Value,
    reference: &Value,
    is_match: impl FnOnce(&str, &str) -> bool,
) -> Result<bool, CompareError> {
    match (request, reference) {
        (Value::String(subject), Value::String(pattern)) => Ok(is_match(subject, pattern)),
        (Value::String(_), _) => Err(mismatch(CompareOp::Regexp, request, reference)),
        _ => Err(unsupported(CompareOp::Regexp, request)),
    }
}
