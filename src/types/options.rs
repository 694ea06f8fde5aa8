use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::CompareError;
use super::node::{Node, NodeId};
use super::request::Request;
use super::tree::Tree;

/// Signature of a caller-registered operator.
///
/// Receives the whole request, the tree and the node under evaluation, and
/// returns the selected node (usually `node` itself), `None` for no match, or
/// an error.
pub type OperatorFn =
    dyn Fn(&Request, &Tree, &Node) -> Result<Option<NodeId>, CompareError> + Send + Sync;

/// Per-call resolution settings.
///
/// # Example
///
/// ```
/// use dtree::ResolveOptions;
///
/// let options = ResolveOptions::new()
///     .stop_if_converting_error(true)
///     .operator("even", |request, _tree, node| {
///         let even = request
///             .value_of(node.key())
///             .as_f64()
///             .is_some_and(|n| n % 2.0 == 0.0);
///         Ok(even.then_some(node.index()))
///     });
///
/// assert!(options.has_operator("even"));
/// ```
#[derive(Clone, Default)]
pub struct ResolveOptions {
    pub(crate) stop_if_converting_error: bool,
    pub(crate) override_existing_operator: bool,
    operators: HashMap<String, Arc<OperatorFn>>,
}

impl ResolveOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort resolution on the first comparator error instead of skipping
    /// the failing sibling.
    #[must_use]
    pub fn stop_if_converting_error(mut self, stop: bool) -> Self {
        self.stop_if_converting_error = stop;
        self
    }

    /// Let registered operators shadow built-ins that share their name.
    #[must_use]
    pub fn override_existing_operator(mut self, enabled: bool) -> Self {
        self.override_existing_operator = enabled;
        self
    }

    /// Register a custom operator under `name`. A later registration with the
    /// same name replaces the earlier one.
    ///
    /// Registering a built-in name (`eq`, `%`, `ab`, ...) does not by itself
    /// replace the built-in: the built-in keeps winning, with a warning logged
    /// on each evaluation, until
    /// [`override_existing_operator`](Self::override_existing_operator) is set.
    ///
    /// ```
    /// use dtree::{NodeRecord, Request, ResolveOptions, Tree};
    ///
    /// let tree = Tree::from_records(vec![
    ///     NodeRecord::new(1, 0).name("root"),
    ///     NodeRecord::new(2, 1).when("x", "eq", 1_i64).name("hit"),
    /// ])
    /// .unwrap();
    /// let request = Request::new().set("x", 1_i64);
    /// let never = ResolveOptions::new().operator("eq", |_, _, _| Ok(None));
    ///
    /// assert_eq!(tree.resolve(&request, &never).node().name(), Some("hit"));
    ///
    /// let never = never.override_existing_operator(true);
    /// assert_eq!(tree.resolve(&request, &never).node().name(), Some("root"));
    /// ```
    #[must_use]
    pub fn operator<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Request, &Tree, &Node) -> Result<Option<NodeId>, CompareError>
            + Send
            + Sync
            + 'static,
    {
        self.operators.insert(name.to_owned(), Arc::new(f));
        self
    }

    #[must_use]
    pub fn has_operator(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    pub(crate) fn custom(&self, name: &str) -> Option<&OperatorFn> {
        self.operators.get(name).map(Arc::as_ref)
    }

    #[must_use]
    pub fn stops_on_error(&self) -> bool {
        self.stop_if_converting_error
    }

    #[must_use]
    pub fn overrides_builtins(&self) -> bool {
        self.override_existing_operator
    }
}

impl fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ResolveOptions")
            .field("stop_if_converting_error", &self.stop_if_converting_error)
            .field("override_existing_operator", &self.override_existing_operator)
            .field("operators", &names)
            .finish()
    }
}
