//! Lexer adapter.
//!
//! The parser never talks to a scanner directly. It asks the [`LexerAdapter`]
//! for the token at a position, passing the set of terminals the current parse
//! state can accept. The adapter calls the configured [`TokenSource`], attaches
//! row/column positions, merges runs of unrecognized bytes into a single error
//! token and records how far past its end each token's scan looked. That
//! lookahead is what lets incremental reparsing decide whether an unchanged
//! token is still valid after an edit next to it.

mod dfa;

pub use dfa::TableLexer;

use crate::base::{Length, SymbolId};
use crate::table::{EOF, ERROR, TerminalSet};

/// Result of one scanner call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub symbol: SymbolId,
    /// Length of the token in bytes.
    pub len: usize,
    /// Bytes from the token start the scanner inspected to make its decision.
    /// At least `len`; scanners that read one byte past the token report `len + 1`.
    pub lookahead: usize,
}

impl Lexeme {
    pub fn new(symbol: SymbolId, len: usize, lookahead: usize) -> Self {
        Self { symbol, len, lookahead: lookahead.max(len) }
    }

    /// End of input. Looks one byte ahead so that appending text invalidates it.
    pub fn eof() -> Self {
        Self { symbol: EOF, len: 0, lookahead: 1 }
    }

    /// Unrecognized input of `len` bytes.
    pub fn error(len: usize, lookahead: usize) -> Self {
        Self::new(ERROR, len, lookahead)
    }
}

/// A pluggable scanner.
///
/// Implementations must return [`EOF`] with zero length at the end of `source`
/// and [`ERROR`] when nothing matches. When the grammar lexes context-sensitively
/// the returned symbol must be a member of `valid`.
pub trait TokenSource {
    fn next_token(&mut self, source: &[u8], offset: usize, valid: &TerminalSet) -> Lexeme;
}

impl<F> TokenSource for F
where
    F: FnMut(&[u8], usize, &TerminalSet) -> Lexeme,
{
    fn next_token(&mut self, source: &[u8], offset: usize, valid: &TerminalSet) -> Lexeme {
        self(source, offset, valid)
    }
}

/// A positioned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: SymbolId,
    pub start: Length,
    pub len: Length,
    /// Bytes past the token end the scan depended on.
    pub lookahead: u32,
}

impl Token {
    pub fn end(&self) -> Length {
        self.start + self.len
    }

    /// Absolute byte offset up to which this token's scan looked.
    pub fn reach(&self) -> usize {
        self.end().offset() + self.lookahead as usize
    }

    pub fn is_eof(&self) -> bool {
        self.symbol == EOF
    }
}

/// Positions tokens produced by a [`TokenSource`] over one source buffer.
pub struct LexerAdapter<'s> {
    source: &'s [u8],
    scanner: &'s mut dyn TokenSource,
    terminal_count: usize,
}

impl<'s> LexerAdapter<'s> {
    pub fn new(source: &'s [u8], scanner: &'s mut dyn TokenSource, terminal_count: usize) -> Self {
        Self { source, scanner, terminal_count }
    }

    pub fn source(&self) -> &'s [u8] {
        self.source
    }

    /// Lex the token starting at `at`.
    pub fn lex(&mut self, at: Length, valid: &TerminalSet) -> Token {
        let offset = at.offset();
        let first = self.scan(offset, valid);
        if first.symbol != ERROR {
            return self.position(at, first);
        }

        // Extend the error token over every following byte that also fails to lex.
        let mut end = offset + first.len;
        let mut reach = offset + first.lookahead;
        while end < self.source.len() {
            let next = self.scan(end, valid);
            if next.symbol != ERROR {
                break;
            }
            end += next.len;
            reach = reach.max(end - next.len + next.lookahead);
        }
        tracing::trace!(start = offset, end, "unrecognized input");
        self.position(at, Lexeme::error(end - offset, reach - offset))
    }

    fn scan(&mut self, offset: usize, valid: &TerminalSet) -> Lexeme {
        if offset >= self.source.len() {
            return Lexeme::eof();
        }
        let lexeme = self.scanner.next_token(self.source, offset, valid);
        let in_range = offset + lexeme.len <= self.source.len() && (lexeme.symbol as usize) < self.terminal_count;
        if lexeme.symbol == EOF || lexeme.len == 0 || !in_range {
            // A scanner must make progress before the end of input.
            let len = char_len(self.source, offset);
            return Lexeme::error(len, len + 1);
        }
        lexeme
    }

    fn position(&self, at: Length, lexeme: Lexeme) -> Token {
        let offset = at.offset();
        let len = Length::of(&self.source[offset..offset + lexeme.len]);
        Token {
            symbol: lexeme.symbol,
            start: at,
            len,
            lookahead: (lexeme.lookahead.max(lexeme.len) - lexeme.len) as u32,
        }
    }
}

/// Width of the UTF-8 sequence starting at `offset`, clamped to the buffer.
pub(crate) fn char_len(source: &[u8], offset: usize) -> usize {
    let width = match source.get(offset) {
        None => return 0,
        Some(b) if *b < 0x80 => 1,
        Some(b) if *b >= 0xF0 => 4,
        Some(b) if *b >= 0xE0 => 3,
        Some(b) if *b >= 0xC0 => 2,
        Some(_) => 1,
    };
    width.min(source.len() - offset)
}

#[cfg(test)]
mod tests;
