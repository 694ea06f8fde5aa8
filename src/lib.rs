//! Decision-tree resolution: branching business logic encoded as data.
//!
//! A [`Tree`] is built from flat [`NodeRecord`]s. Resolving a [`Request`]
//! walks it from the root, descending into the first child whose operator
//! matches, and returns the deepest node reached.
//!
//! ```
//! use dtree::{NodeRecord, Request, ResolveOptions, Tree};
//!
//! let tree = Tree::from_records(vec![
//!     NodeRecord::new(1, 0).name("root"),
//!     NodeRecord::new(2, 1).when("age", "gt", 60_i64).name("Hello Sir"),
//!     NodeRecord::new(3, 1).value("fallback").name("Hello dude"),
//! ])
//! .unwrap();
//!
//! let request = Request::new().set("age", 35_i64);
//! let resolution = tree.resolve(&request, &ResolveOptions::new());
//! assert_eq!(resolution.node().name(), Some("Hello dude"));
//! ```

mod bucket;
mod compare;
mod dispatch;
mod error;
#[cfg(feature = "json")]
mod load;
mod resolve;
mod types;

pub use bucket::BucketOp;
pub use compare::CompareOp;
pub use dispatch::Operator;
pub use error::DtreeError;
pub use types::{
    BuildError, CompareError, Node, NodeId, NodeRecord, OperatorFn, Request, Resolution,
    ResolveOptions, Trail, TrailEntry, Tree, TreeBuilder, Value, DEFAULT_FALLBACK,
};
