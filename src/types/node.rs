use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::value::Value;

/// Stable handle to a node inside a [`Tree`](crate::Tree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Flat node description, as handed over by a loader before linking.
///
/// Every field except `id` may be omitted from a serialized record or set to
/// `null`; both decode to the field's default.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
pub struct NodeRecord {
    pub id: i64,
    #[cfg_attr(feature = "json", serde(default, alias = "Name"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "json", serde(default, deserialize_with = "null_as_default"))]
    pub parent_id: i64,
    #[cfg_attr(feature = "json", serde(default))]
    pub value: Value,
    #[cfg_attr(feature = "json", serde(default, deserialize_with = "null_as_default"))]
    pub operator: String,
    #[cfg_attr(feature = "json", serde(default, deserialize_with = "null_as_default"))]
    pub key: String,
    #[cfg_attr(feature = "json", serde(default, deserialize_with = "null_as_default"))]
    pub order: i64,
    #[cfg_attr(feature = "json", serde(default))]
    pub content: Value,
    #[cfg_attr(feature = "json", serde(default, deserialize_with = "null_as_default"))]
    pub headers: BTreeMap<String, Value>,
    #[cfg_attr(feature = "json", serde(default, deserialize_with = "null_as_default"))]
    pub legacy: BTreeMap<String, Vec<Value>>,
}

#[cfg(feature = "json")]
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;

    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl NodeRecord {
    #[must_use]
    pub fn new(id: i64, parent_id: i64) -> Self {
        Self {
            id,
            parent_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the request field, operator and reference value in one go.
    #[must_use]
    pub fn when(mut self, key: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.key = key.to_owned();
        self.operator = operator.to_owned();
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn operator(mut self, operator: &str) -> Self {
        self.operator = operator.to_owned();
        self
    }

    #[must_use]
    pub fn key(mut self, key: &str) -> Self {
        self.key = key.to_owned();
        self
    }

    #[must_use]
    pub fn order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<Value>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.headers.insert(name.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn legacy<T: Into<Value>>(mut self, key: &str, values: Vec<T>) -> Self {
        self.legacy
            .insert(key.to_owned(), values.into_iter().map(Into::into).collect());
        self
    }
}

/// A linked node. Owned by the [`Tree`](crate::Tree) arena; the parent link is
/// an index, never an owning pointer.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) index: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) record: NodeRecord,
    pattern: OnceLock<Option<Regex>>,
}

impl Node {
    pub(crate) fn new(index: NodeId, record: NodeRecord) -> Self {
        Self {
            index,
            parent: None,
            children: Vec::new(),
            record,
            pattern: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn index(&self) -> NodeId {
        self.index
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        self.record.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.record.name.as_deref()
    }

    #[must_use]
    pub fn parent_id(&self) -> i64 {
        self.record.parent_id
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.record.value
    }

    #[must_use]
    pub fn operator(&self) -> &str {
        &self.record.operator
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.record.key
    }

    #[must_use]
    pub fn order(&self) -> i64 {
        self.record.order
    }

    #[must_use]
    pub fn content(&self) -> &Value {
        &self.record.content
    }

    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, Value> {
        &self.record.headers
    }

    /// Legacy annotations, already merged with every ancestor's.
    #[must_use]
    pub fn legacy(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.record.legacy
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in evaluation order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Display label: the name when set, otherwise `key operator value`.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(name) = self.name().filter(|n| !n.is_empty()) {
            return name.to_owned();
        }
        let value = if self.value().is_null() {
            String::new()
        } else {
            self.value().to_string()
        };
        format!("{} {} {}", self.key(), self.operator(), value)
            .trim()
            .to_owned()
    }

    /// Compiled regexp for this node's value; `None` when the value is not a
    /// string or is not a valid pattern. Compiled at most once.
    pub(crate) fn pattern(&self) -> Option<&Regex> {
        self.pattern
            .get_or_init(|| self.value().as_str().and_then(|p| Regex::new(p).ok()))
            .as_ref()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(record: NodeRecord) -> Node {
        Node::new(NodeId(0), record)
    }

    #[test]
    fn label_prefers_name() {
        let n = node(NodeRecord::new(1, 0).name("Hello").when("age", "gt", 10_i64));
        assert_eq!(n.label(), "Hello");
    }

    #[test]
    fn label_without_name() {
        let n = node(NodeRecord::new(1, 0).when("age", "gt", 10_i64));
        assert_eq!(n.label(), "age gt 10");
    }

    #[test]
    fn label_of_bare_node_is_empty() {
        let n = node(NodeRecord::new(1, 0));
        assert_eq!(n.label(), "");
    }

    #[test]
    fn pattern_compiles_once() {
        let n = node(NodeRecord::new(1, 0).when("email", "regexp", "@example\\.com$"));
        let first = n.pattern().map(|r| r as *const Regex);
        let second = n.pattern().map(|r| r as *const Regex);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_pattern_is_none() {
        let n = node(NodeRecord::new(1, 0).when("email", "regexp", "(unclosed"));
        assert!(n.pattern().is_none());
    }

    #[test]
    fn record_builder_collects_payload() {
        let r = NodeRecord::new(3, 1)
            .content("body")
            .header("x-version", 2_i64)
            .legacy("cost", vec![10_i64]);
        assert_eq!(r.content, Value::from("body"));
        assert_eq!(r.headers["x-version"], Value::Number(2.0));
        assert_eq!(r.legacy["cost"], vec![Value::Number(10.0)]);
    }
}
