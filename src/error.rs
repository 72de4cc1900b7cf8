//! Error types surfaced to callers.
//!
//! Only load-time and cancellation conditions are errors. Everything that can go
//! wrong while parsing source text is absorbed into the tree as error and missing
//! nodes and reported through [`crate::parser::SyntaxError`] diagnostics.

use thiserror::Error;

/// Errors returned by table loading, grammar compilation and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The table blob's format, version or contents are not what the engine expects.
    #[error("Malformed parse table: {reason}")]
    MalformedTable { reason: String },

    /// A grammar definition could not be compiled into a table.
    #[error("Invalid grammar: {reason}")]
    Grammar { reason: String },

    /// The caller's cancellation token was signalled during a parse.
    #[error("Parse cancelled")]
    Cancelled,
}

impl Error {
    /// Create a malformed table error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedTable { reason: reason.into() }
    }

    /// Create a grammar compilation error.
    pub fn grammar(reason: impl Into<String>) -> Self {
        Self::Grammar { reason: reason.into() }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
