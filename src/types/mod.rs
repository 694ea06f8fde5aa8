mod error;
mod node;
mod options;
mod request;
mod resolution;
mod trail;
mod tree;
mod value;

pub use error::{BuildError, CompareError};
pub use node::{Node, NodeId, NodeRecord};
pub use options::{OperatorFn, ResolveOptions};
pub use request::Request;
pub use resolution::Resolution;
pub use trail::{Trail, TrailEntry};
pub use tree::{Tree, TreeBuilder, DEFAULT_FALLBACK};
pub use value::Value;
