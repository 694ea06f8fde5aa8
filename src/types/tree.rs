use std::collections::{HashMap, VecDeque};
use std::fmt;

use super::error::BuildError;
use super::node::{Node, NodeId, NodeRecord};
use super::options::ResolveOptions;
use super::request::Request;
use super::resolution::Resolution;
use super::trail::Trail;

/// Default sentinel value marking a fallback node.
pub const DEFAULT_FALLBACK: &str = "fallback";

/// Builder for linking flat [`NodeRecord`]s into a [`Tree`].
///
/// # Example
///
/// ```
/// use dtree::{NodeRecord, Tree};
///
/// let tree = Tree::builder()
///     .node(NodeRecord::new(1, 0).name("root"))
///     .node(NodeRecord::new(2, 1).when("beta", "eq", true).name("beta"))
///     .node(NodeRecord::new(3, 1).value("fallback").name("stable"))
///     .build()
///     .unwrap();
///
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    records: Vec<NodeRecord>,
    fallback: String,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            fallback: DEFAULT_FALLBACK.to_owned(),
        }
    }
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the fallback sentinel (defaults to `"fallback"`).
    #[must_use]
    pub fn fallback(mut self, sentinel: impl Into<String>) -> Self {
        self.fallback = sentinel.into();
        self
    }

    #[must_use]
    pub fn node(mut self, record: NodeRecord) -> Self {
        self.records.push(record);
        self
    }

    #[must_use]
    pub fn nodes(mut self, records: impl IntoIterator<Item = NodeRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Link the collected records.
    ///
    /// The root is the last record with `parent_id == 0`. A later record with
    /// an already seen `id` replaces the earlier one. Records that cannot be
    /// reached from the root are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingRoot`] if no record has `parent_id == 0`.
    pub fn build(self) -> Result<Tree, BuildError> {
        let mut slots: Vec<Option<NodeRecord>> = Vec::with_capacity(self.records.len());
        let mut positions: HashMap<i64, usize> = HashMap::new();

        for record in self.records {
            match positions.get(&record.id) {
                Some(&pos) => {
                    tracing::warn!(id = record.id, "duplicate node id, later record wins");
                    slots[pos] = Some(record);
                }
                None => {
                    positions.insert(record.id, slots.len());
                    slots.push(Some(record));
                }
            }
        }

        let root_pos = slots
            .iter()
            .rposition(|s| s.as_ref().is_some_and(|r| r.parent_id == 0))
            .ok_or(BuildError::MissingRoot)?;

        // parent id -> child slot positions, in input order
        let mut pending: HashMap<i64, Vec<usize>> = HashMap::new();
        for (pos, slot) in slots.iter().enumerate() {
            if let Some(record) = slot {
                if record.parent_id != 0 {
                    pending.entry(record.parent_id).or_default().push(pos);
                }
            }
        }

        let root_record = slots[root_pos].take().ok_or(BuildError::MissingRoot)?;
        let mut tree = Tree::with_fallback(root_record, self.fallback);

        // Breadth-first, so every parent carries its full legacy chain before
        // its children merge with it.
        let mut queue = VecDeque::from([tree.root]);
        while let Some(parent) = queue.pop_front() {
            let parent_id = tree.nodes[parent.0].id();
            let Some(child_positions) = pending.remove(&parent_id) else {
                continue;
            };
            for pos in child_positions {
                if let Some(record) = slots[pos].take() {
                    let child = tree.attach(parent, record);
                    queue.push_back(child);
                }
            }
        }

        for record in slots.into_iter().flatten() {
            tracing::warn!(
                id = record.id,
                parent_id = record.parent_id,
                "node is not reachable from the root, dropped"
            );
        }

        Ok(tree)
    }
}

/// An immutable-after-build decision tree stored as an arena.
///
/// Resolution only reads the tree, so a built `Tree` can be shared across
/// threads behind an `Arc`. Appending with [`add_child`](Self::add_child)
/// requires exclusive access.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    ids: HashMap<i64, NodeId>,
    root: NodeId,
    fallback: String,
}

impl Tree {
    #[must_use]
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    /// Link records using the default fallback sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingRoot`] if no record has `parent_id == 0`.
    pub fn from_records(records: impl IntoIterator<Item = NodeRecord>) -> Result<Self, BuildError> {
        TreeBuilder::new().nodes(records).build()
    }

    /// A single-node tree rooted at `root`.
    #[must_use]
    pub fn new(root: NodeRecord) -> Self {
        Self::with_fallback(root, DEFAULT_FALLBACK)
    }

    #[must_use]
    pub fn with_fallback(root: NodeRecord, sentinel: impl Into<String>) -> Self {
        let root_id = root.id;
        let index = NodeId(0);
        Self {
            nodes: vec![Node::new(index, root)],
            ids: HashMap::from([(root_id, index)]),
            root: index,
            fallback: sentinel.into(),
        }
    }

    /// Append `record` under `parent`, merging the parent's legacy annotations
    /// into it and re-sorting the parent's children.
    ///
    /// Siblings attached earlier keep the legacy values they merged at their
    /// own attachment time.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownParent`] if `parent` is not in this tree.
    pub fn add_child(&mut self, parent: NodeId, record: NodeRecord) -> Result<NodeId, BuildError> {
        if parent.0 >= self.nodes.len() {
            return Err(BuildError::UnknownParent {
                index: parent.index(),
            });
        }
        Ok(self.attach(parent, record))
    }

    fn attach(&mut self, parent: NodeId, mut record: NodeRecord) -> NodeId {
        // Child values lead, ancestor values follow.
        for (key, values) in &self.nodes[parent.0].record.legacy {
            record
                .legacy
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }

        let index = NodeId(self.nodes.len());
        if self.ids.insert(record.id, index).is_some() {
            tracing::warn!(id = record.id, "node id already present, lookup now points to the new node");
        }
        let mut node = Node::new(index, record);
        node.parent = Some(parent);
        self.nodes.push(node);

        let mut children = std::mem::take(&mut self.nodes[parent.0].children);
        children.push(index);
        children.sort_by_key(|&c| {
            let n = &self.nodes[c.0];
            (self.is_fallback(n), n.order())
        });
        self.nodes[parent.0].children = children;

        index
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[self.root.0]
    }

    #[must_use]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Look a node up by its record `id`.
    #[must_use]
    pub fn node_by_id(&self, id: i64) -> Option<&Node> {
        self.ids.get(&id).and_then(|&idx| self.get(idx))
    }

    /// Children of `id` in evaluation order. Empty for an unknown id.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.get(id)
            .map(Node::children)
            .unwrap_or_default()
            .iter()
            .filter_map(|&c| self.get(c))
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Number of linked nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// The fallback sentinel this tree was built with.
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    #[must_use]
    pub fn is_fallback(&self, node: &Node) -> bool {
        node.value().is_sentinel(&self.fallback)
    }

    /// Resolve `request` from the root down to the deepest matching node.
    pub fn resolve(&self, request: &Request, options: &ResolveOptions) -> Resolution<'_> {
        crate::resolve::resolve(self, request, options, None)
    }

    /// Like [`resolve`](Self::resolve), appending every descent to `trail`.
    pub fn resolve_traced(
        &self,
        request: &Request,
        options: &ResolveOptions,
        trail: &mut Trail,
    ) -> Resolution<'_> {
        crate::resolve::resolve(self, request, options, Some(trail))
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = &self.nodes[id.0];
        writeln!(f, "{:indent$}{}", "", node.label(), indent = depth * 2)?;
        for &child in node.children() {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, 0)
    }
}
