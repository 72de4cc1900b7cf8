//! Incremental, error-tolerant generalized LR parser
//!
//! ## Architecture
//!
//! ```text
//! Source bytes
//!     ↓
//! LexerAdapter → Tokens for the terminals the current state accepts
//!     ↓
//! Driver → one Head per live branch, forked on table conflicts
//!     ↓          ↘ recovery: missing nodes, error nodes
//! NodeCache → GreenNode tree (shared, deduplicated)
//!     ↓
//! Tree → SyntaxNode / TreeCursor / diagnostics
//! ```
//!
//! ## Incremental Reparsing
//!
//! When text changes, the caller:
//! 1. Applies an [`Edit`](crate::Edit) to the old tree, marking touched nodes
//! 2. Calls [`Parser::reparse`] with the edited tree and the new source
//!
//! The parser then pushes unchanged subtrees of the old tree whole wherever
//! the parse state allows it, and lexes only around the edit. Reused nodes are
//! the same shared nodes as in the old tree.

mod config;
mod driver;
pub mod errors;
mod recovery;
mod reuse;
mod stack;

pub use config::ParserConfig;
pub use errors::{ErrorCode, RelatedInfo, Severity, SyntaxError, SyntaxErrorBuilder};

use std::sync::Arc;

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::language::Language;
use crate::lexer::{LexerAdapter, TokenSource};
use crate::syntax::Tree;
use driver::Driver;

/// A reusable parser bound to one [`Language`].
///
/// Parsing does not fail on malformed input; the tree records what went wrong.
/// The only errors are cancellation and misuse reported at load time.
#[derive(Debug, Clone)]
pub struct Parser {
    language: Language,
    config: ParserConfig,
    cancellation: Option<CancellationToken>,
}

impl Parser {
    pub fn new(language: Language) -> Self {
        Self::with_config(language, ParserConfig::default())
    }

    pub fn with_config(language: Language, config: ParserConfig) -> Self {
        Self { language, config, cancellation: None }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Install (or clear) the token checked before every parse round.
    pub fn set_cancellation_token(&mut self, token: Option<CancellationToken>) {
        self.cancellation = token;
    }

    /// Parse `source` from scratch with the language's scanner.
    pub fn parse(&mut self, source: &[u8]) -> Result<Tree> {
        let mut scanner = self.language.scanner();
        self.run(source, scanner.as_mut(), None)
    }

    /// Parse `source` from scratch with a caller-supplied scanner.
    pub fn parse_with(&mut self, source: &[u8], scanner: &mut dyn TokenSource) -> Result<Tree> {
        self.run(source, scanner, None)
    }

    /// Parse `source`, reusing what survived of `edited`.
    ///
    /// `edited` must be a tree of this language with every change between its
    /// source and `source` applied through [`Tree::edit`]. Otherwise the old
    /// tree is ignored and `source` is parsed from scratch. Either way the
    /// result equals a fresh parse of `source`.
    pub fn reparse(&mut self, edited: &Tree, source: &[u8]) -> Result<Tree> {
        let mut scanner = self.language.scanner();
        self.run(source, scanner.as_mut(), Some(edited))
    }

    pub fn reparse_with(&mut self, edited: &Tree, source: &[u8], scanner: &mut dyn TokenSource) -> Result<Tree> {
        self.run(source, scanner, Some(edited))
    }

    fn run(&self, source: &[u8], scanner: &mut dyn TokenSource, seed: Option<&Tree>) -> Result<Tree> {
        let table = self.language.table();
        let seed = seed.filter(|tree| self.config.incremental && self.seed_is_usable(tree, source));
        tracing::trace!(language = %table.name(), bytes = source.len(), incremental = seed.is_some(), "parsing");

        let lexer = LexerAdapter::new(source, scanner, table.terminal_count());
        let driver = Driver::new(table, &self.config, self.cancellation.as_ref(), lexer, seed.map(Tree::root));
        let root = driver.run()?;
        Ok(Tree::new(root, Arc::clone(self.language.table_arc())))
    }

    fn seed_is_usable(&self, tree: &Tree, source: &[u8]) -> bool {
        if !Arc::ptr_eq(tree.table_arc(), self.language.table_arc()) {
            tracing::warn!(
                tree_language = %tree.table().name(),
                language = %self.language.name(),
                "old tree was built by another language; parsing from scratch"
            );
            return false;
        }
        if tree.len() != source.len() {
            tracing::warn!(
                tree_bytes = tree.len(),
                source_bytes = source.len(),
                "old tree does not match the source; apply every edit before reparsing"
            );
            return false;
        }
        true
    }
}

/// Parse `source` with the default configuration.
///
/// `scanner` replaces the language's own scanner when given.
pub fn parse(language: &Language, source: &[u8], scanner: Option<&mut dyn TokenSource>) -> Result<Tree> {
    let mut parser = Parser::new(language.clone());
    match scanner {
        Some(scanner) => parser.parse_with(source, scanner),
        None => parser.parse(source),
    }
}

/// Reparse `source` after `edited` had its edits applied.
pub fn reparse(language: &Language, edited: &Tree, source: &[u8]) -> Result<Tree> {
    Parser::new(language.clone()).reparse(edited, source)
}

/// Parse independent documents in parallel.
///
/// Results are in the order of `sources`.
pub fn parse_batch(language: &Language, sources: &[&[u8]]) -> Vec<Result<Tree>> {
    tracing::debug!(language = %language.name(), documents = sources.len(), "parsing batch");
    sources.par_iter().map(|source| parse(language, source, None)).collect()
}
