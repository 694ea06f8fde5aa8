use std::fmt;

use super::error::CompareError;
use super::node::Node;

/// Outcome of resolving a request against a [`Tree`](crate::Tree).
///
/// `node` is the deepest node reached. When resolution was halted by a
/// comparator error (see
/// [`ResolveOptions::stop_if_converting_error`](crate::ResolveOptions::stop_if_converting_error))
/// `error` is set and `node` is the parent whose children were being scanned.
#[derive(Debug, Clone)]
#[must_use]
pub struct Resolution<'t> {
    node: &'t Node,
    error: Option<CompareError>,
}

impl<'t> Resolution<'t> {
    pub(crate) fn complete(node: &'t Node) -> Self {
        Self { node, error: None }
    }

    pub(crate) fn halted(node: &'t Node, error: CompareError) -> Self {
        Self {
            node,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn node(&self) -> &'t Node {
        self.node
    }

    #[must_use]
    pub fn error(&self) -> Option<&CompareError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.error.is_some()
    }

    #[must_use]
    pub fn into_parts(self) -> (&'t Node, Option<CompareError>) {
        (self.node, self.error)
    }

    /// The reached node, or the halting error.
    ///
    /// # Errors
    ///
    /// Returns the comparator error that stopped resolution.
    pub fn into_result(self) -> Result<&'t Node, CompareError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.node),
        }
    }
}

impl fmt::Display for Resolution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {} ({})", self.node.id(), self.node.label())?;
        if let Some(err) = &self.error {
            write!(f, ", halted: {err}")?;
        }
        Ok(())
    }
}
