//! Syntax trees: shared green nodes, positioned views and edits.
//!
//! ```text
//! GreenNode   → immutable Arc node, relative Length, shared between trees
//!     ↓
//! Tree        → root GreenNode + the ParseTable that names its symbols
//!     ↓
//! SyntaxNode  → borrowed view with absolute positions, hidden nodes flattened
//! ```

mod builder;
mod cursor;
mod edit;
mod node;
mod tree;

pub use cursor::TreeCursor;
pub use edit::Edit;
pub use node::{GreenNode, NodeKind};
pub use tree::{SyntaxNode, Tree};

pub(crate) use builder::{NodeCache, finish_root};
pub(crate) use node::NodeFlags;
