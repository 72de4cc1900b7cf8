//! Foundation types shared by every layer of the engine.
//!
//! - [`TextRange`], [`TextSize`] - byte offsets (re-exported from `text-size`)
//! - [`Point`], [`PointRange`] - row/column positions
//! - [`Length`] - relative size of a span, the unit nodes are measured in
//! - [`SymbolId`], [`StateId`], [`ProductionId`] - grammar table indices
//!
//! This module has NO dependencies on other modules of the crate.

mod position;

pub use position::{Length, Point, PointRange};
pub use text_size::{TextRange, TextSize};

/// Index of a terminal or nonterminal symbol in a grammar table.
pub type SymbolId = u16;

/// Index of a parse state in a grammar table.
pub type StateId = u16;

/// Index of a production (rule alternative) in a grammar table.
pub type ProductionId = u16;
