use thiserror::Error;

use crate::BuildError;

/// Unified error type covering decoding, tree building, and I/O.
///
/// Returned by convenience methods like [`Tree::from_json()`](crate::Tree::from_json)
/// and [`Tree::from_file()`](crate::Tree::from_file). Comparator errors are not
/// part of it: they are reported on the [`Resolution`](crate::Resolution).
#[derive(Debug, Error)]
pub enum DtreeError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "json")]
    #[error("failed to decode JSON document: {0}")]
    Decode(#[from] serde_json::Error),
}
