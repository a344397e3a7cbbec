//! The filter composition tree.
//!
//! Filters are stored in a [`FilterTree`] arena and built through borrowed
//! handles. Bool, and and or filters form families that share one root node:
//! bool clauses always address the root's `must`/`must_not`/`should` scopes,
//! and chained `and`/`or` calls register on their root so they compose into a
//! single flat array. Only a family root may be composed.

mod bounds;
mod handle;
mod node;
mod tree;

pub use bounds::Bounds;
pub use handle::{BoolFilter, Filter, Terminal};
pub use node::{BoolClause, Compositor, NodeId};
pub use tree::{FilterTree, ROOT};
