use std::collections::HashMap;

use super::Value;

static NULL: Value = Value::Null;

/// Request mapping field names to [`Value`]s.
///
/// Keys are flat: `"user.id"` is a single field name, not a path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    fields: HashMap<String, Value>,
}

impl Request {
    /// Create an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, builder style.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Set a field (mutable reference version).
    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field value, or [`Value::Null`] when the field is absent.
    #[must_use]
    pub fn value_of(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, Value>> for Request {
    fn from(fields: HashMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Request {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
