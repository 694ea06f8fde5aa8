//! JSON loading of trees and requests.
//!
//! A tree document is an array of flat node records:
//!
//! ```json
//! [
//!   { "id": 1, "name": "root" },
//!   { "id": 2, "parent_id": 1, "key": "age", "operator": "gt", "value": 60 },
//!   { "id": 3, "parent_id": 2, "name": "Hello Sir", "value": "fallback" }
//! ]
//! ```
//!
//! A request document is a single JSON object mapping field names to values.

use std::collections::HashMap;
use std::path::Path;

use crate::types::{NodeRecord, Request, Resolution, ResolveOptions, Tree, TreeBuilder, Value};
use crate::DtreeError;

impl Tree {
    /// Decode a JSON array of node records and link it.
    ///
    /// # Errors
    ///
    /// Returns [`DtreeError::Decode`] on malformed JSON and
    /// [`DtreeError::Build`] when no root record is present.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DtreeError> {
        Self::from_json_with_builder(bytes, TreeBuilder::new())
    }

    /// Like [`from_json`](Self::from_json) with a custom fallback sentinel.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_json_with_fallback(bytes: &[u8], sentinel: &str) -> Result<Self, DtreeError> {
        Self::from_json_with_builder(bytes, TreeBuilder::new().fallback(sentinel))
    }

    /// Read and decode a JSON tree document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DtreeError::Io`] if the file cannot be read, otherwise see
    /// [`from_json`](Self::from_json).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DtreeError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    fn from_json_with_builder(bytes: &[u8], builder: TreeBuilder) -> Result<Self, DtreeError> {
        let records: Vec<NodeRecord> = serde_json::from_slice(bytes)?;
        tracing::debug!(records = records.len(), "decoded tree document");
        Ok(builder.nodes(records).build()?)
    }

    /// Decode a JSON request and resolve it.
    ///
    /// # Errors
    ///
    /// Returns [`DtreeError::Decode`] if the request is not a JSON object.
    /// Comparator errors are reported on the returned [`Resolution`].
    pub fn resolve_json(
        &self,
        request: &[u8],
        options: &ResolveOptions,
    ) -> Result<Resolution<'_>, DtreeError> {
        let request = Request::from_json(request)?;
        Ok(self.resolve(&request, options))
    }
}

impl Request {
    /// Decode a JSON object into a request.
    ///
    /// # Errors
    ///
    /// Returns [`DtreeError::Decode`] if the document is malformed or not an
    /// object.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DtreeError> {
        let fields: HashMap<String, Value> = serde_json::from_slice(bytes)?;
        Ok(Self::from(fields))
    }
}
