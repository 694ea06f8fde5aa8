use std::collections::BTreeMap;
use std::fmt;

use super::error::CompareError;
use crate::compare::{self, CompareOp};

/// Polymorphic operand carried by requests and nodes.
///
/// Numbers are always stored as `f64`; integer inputs are widened on conversion.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(from = "serde_json::Value"))]
pub enum Value {
    /// An absent field.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit floating-point number.
    Number(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered sequence, possibly heterogeneous.
    List(Vec<Value>),
    /// A structured object. Carried through as payload, never compared.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Apply a comparator with `self` as the request-side value and
    /// `reference` as the node-side operand.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::TypeMismatch`] or [`CompareError::UnsupportedType`]
    /// when the operator is not defined for this pair of kinds.
    pub fn compare(&self, op: CompareOp, reference: &Value) -> Result<bool, CompareError> {
        compare::apply(op, self, reference)
    }

    /// Static name of this value's kind, used in error messages and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether this value is the fallback sentinel string.
    #[must_use]
    pub fn is_sentinel(&self, sentinel: &str) -> bool {
        self.as_str() == Some(sentinel)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

#[allow(clippy::cast_precision_loss)]
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

#[allow(clippy::cast_precision_loss)]
impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Object(v)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_i64_widens_to_number() {
        assert_eq!(Value::from(42_i64), Value::Number(42.0));
    }

    #[test]
    fn from_f64() {
        assert_eq!(Value::from(3.5_f64), Value::Number(3.5));
    }

    #[test]
    fn from_bool() {
        assert_eq!(Value::from(true), Value::Bool(true));
    }

    #[test]
    fn from_str() {
        assert_eq!(Value::from("hello"), Value::String("hello".to_owned()));
    }

    #[test]
    fn from_vec() {
        assert_eq!(
            Value::from(vec!["a", "b"]),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(3.25).to_string(), "3.25");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::from("hello").to_string(), "\"hello\"");
        assert_eq!(
            Value::List(vec![Value::from(1_i64), Value::from("x")]).to_string(),
            "[1, \"x\"]"
        );
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from(1.0).kind(), "number");
        assert_eq!(Value::Object(BTreeMap::new()).kind(), "object");
    }

    #[test]
    fn sentinel_detection() {
        assert!(Value::from("fallback").is_sentinel("fallback"));
        assert!(!Value::from("Fallback").is_sentinel("fallback"));
        assert!(!Value::from(1.0).is_sentinel("fallback"));
    }

    #[cfg(feature = "json")]
    #[test]
    fn from_json_value() {
        let json = serde_json::json!({"a": [1, "b", true], "n": null});
        let value = Value::from(json);
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        assert_eq!(
            map["a"],
            Value::List(vec![Value::Number(1.0), Value::from("b"), Value::Bool(true)])
        );
        assert_eq!(map["n"], Value::Null);
    }
}
