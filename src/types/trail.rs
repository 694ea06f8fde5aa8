use std::fmt;

use super::value::Value;

/// One decision taken during resolution: the node that was selected and the
/// request value it was selected with.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailEntry {
    pub node_id: i64,
    pub key: String,
    pub request_value: Value,
    pub operator: String,
    pub node_value: Value,
}

impl fmt::Display for TrailEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {} {} {} {}",
            self.node_id, self.key, self.request_value, self.operator, self.node_value
        )
    }
}

/// Append-only record of the path taken by a resolution.
///
/// Pass one to [`Tree::resolve_traced()`](crate::Tree::resolve_traced) and read
/// it back afterwards. Reusing a trail across calls appends to it.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Trail {
    entries: Vec<TrailEntry>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, entry: TrailEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    /// Human-readable line per decision, in traversal order.
    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64) -> TrailEntry {
        TrailEntry {
            node_id: id,
            key: "age".into(),
            request_value: Value::from(35_i64),
            operator: "lte".into(),
            node_value: Value::from(60_i64),
        }
    }

    #[test]
    fn entry_display() {
        assert_eq!(entry(12).to_string(), "12 : age 35 lte 60");
    }

    #[test]
    fn records_in_order() {
        let mut trail = Trail::new();
        assert!(trail.is_empty());
        trail.record(entry(1));
        trail.record(entry(2));
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.entries()[1].node_id, 2);
        assert_eq!(
            trail.descriptions(),
            vec!["1 : age 35 lte 60", "2 : age 35 lte 60"]
        );
    }

    #[test]
    fn display_joins_lines() {
        let mut trail = Trail::new();
        trail.record(entry(1));
        trail.record(entry(2));
        assert_eq!(trail.to_string(), "1 : age 35 lte 60\n2 : age 35 lte 60");
    }
}
