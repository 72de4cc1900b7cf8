//! # cairo-syntax
//!
//! Incremental, error-tolerant LR/GLR parsing engine with a bundled Cairo grammar.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! cairo, ffi → Bundled Cairo grammar, logos scanner, C entry point
//!   ↓
//! parser     → GLR driver, error recovery, subtree reuse, diagnostics
//!   ↓
//! language   → Language handle: table + scanner factory
//!   ↓
//! syntax     → GreenNode, Tree, SyntaxNode, TreeCursor, Edit
//!   ↓
//! lexer      → TokenSource contract, LexerAdapter, table-driven lexer
//!   ↓
//! table      → ParseTable, actions, blob format   grammar → rule DSL, LALR(1)
//!   ↓
//! base       → Primitives (TextRange, Point, Length, symbol ids)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use cairo_syntax::{Edit, Parser, cairo};
//!
//! let mut parser = Parser::new(cairo::language());
//! let source = b"fn main() { let x = 1; }";
//! let tree = parser.parse(source)?;
//!
//! let edit = Edit::replace(source, 20..21, b"42");
//! let new_source = edit.apply(source, b"42");
//! let tree = parser.reparse(&tree.edit(&edit), &new_source)?;
//! assert!(tree.diagnostics().is_empty());
//! # Ok::<(), cairo_syntax::Error>(())
//! ```

// ============================================================================
// MODULES (dependency order: base → table/grammar → lexer → syntax → language → parser)
// ============================================================================

/// Foundation types: TextRange, Point, Length, table indices
pub mod base;

/// Error type for loading, grammar compilation and cancellation
pub mod error;

/// Compiled parse tables and their blob format
pub mod table;

/// Grammar DSL and LALR(1) table construction
pub mod grammar;

/// Scanner contract and lexer adapter
pub mod lexer;

/// Syntax trees, positioned nodes, cursors and edits
pub mod syntax;

/// Language handles
pub mod language;

/// GLR parser: driver, recovery, incremental reuse, diagnostics
pub mod parser;

/// Bundled Cairo grammar and scanner
pub mod cairo;

/// C entry point for hosts that load grammars by symbol
pub mod ffi;

// Re-export foundation types
pub use base::{Length, Point, PointRange, TextRange, TextSize};

pub use error::{Error, Result};
pub use language::{Language, load_grammar};
pub use lexer::{Lexeme, TokenSource};
pub use parser::{ErrorCode, Parser, ParserConfig, Severity, SyntaxError, parse, parse_batch, reparse};
pub use syntax::{Edit, GreenNode, NodeKind, SyntaxNode, Tree, TreeCursor};
pub use table::{Action, ParseTable};
