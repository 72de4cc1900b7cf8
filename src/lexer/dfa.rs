//! Table-driven scanner built from the terminal patterns of a [`ParseTable`].
//!
//! All literal and regex terminals are compiled into one anchored dense DFA that
//! reports every pattern matching at each position. Stepping the DFA by hand
//! gives the longest match restricted to the valid terminal set and the exact
//! number of bytes inspected.

use std::sync::Arc;

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::util::primitives::StateID;
use regex_automata::{Anchored, Input, MatchKind};

use super::{Lexeme, TokenSource, char_len};
use crate::base::SymbolId;
use crate::error::{Error, Result};
use crate::table::{ParseTable, TerminalPattern, TerminalSet};

#[derive(Debug, Clone, Copy)]
struct PatternInfo {
    symbol: SymbolId,
    literal: bool,
}

impl PatternInfo {
    /// Literals beat regexes of the same length, so keywords win over identifiers.
    fn rank(&self) -> (bool, SymbolId) {
        (!self.literal, self.symbol)
    }
}

/// Longest-match scanner for table terminals. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TableLexer {
    dfa: Option<Arc<dense::DFA<Vec<u32>>>>,
    patterns: Arc<[PatternInfo]>,
}

impl TableLexer {
    /// Compile the terminal patterns of `table`. External terminals are skipped.
    pub fn new(table: &ParseTable) -> Result<Self> {
        let mut sources = Vec::new();
        let mut patterns = Vec::new();
        for id in 0..table.terminal_count() as SymbolId {
            let (source, literal) = match table.symbol(id).and_then(|s| s.pattern.as_ref()) {
                Some(TerminalPattern::Literal(text)) => (regex_syntax::escape(text), true),
                Some(TerminalPattern::Regex(pattern)) => (pattern.clone(), false),
                Some(TerminalPattern::External) | None => continue,
            };
            sources.push(source);
            patterns.push(PatternInfo { symbol: id, literal });
        }
        if sources.is_empty() {
            return Ok(Self { dfa: None, patterns: patterns.into() });
        }

        let dfa = dense::Builder::new()
            .configure(dense::Config::new().match_kind(MatchKind::All).start_kind(StartKind::Anchored))
            .build_many(&sources)
            .map_err(|e| Error::malformed(format!("terminal patterns do not compile: {e}")))?;
        tracing::debug!(patterns = sources.len(), bytes = dfa.memory_usage(), "compiled lexer automaton");
        Ok(Self { dfa: Some(Arc::new(dfa)), patterns: patterns.into() })
    }

    /// Longest valid match at `offset`.
    pub fn lex(&self, source: &[u8], offset: usize, valid: &TerminalSet) -> Lexeme {
        if offset >= source.len() {
            return Lexeme::eof();
        }
        let unmatched = || {
            let len = char_len(source, offset);
            Lexeme::error(len, len + 1)
        };
        let Some(dfa) = self.dfa.as_deref() else {
            return unmatched();
        };
        let input = Input::new(source).range(offset..).anchored(Anchored::Yes);
        let Ok(mut state) = dfa.start_state_forward(&input) else {
            return unmatched();
        };

        let mut best: Option<(usize, PatternInfo)> = None;
        let mut examined = None;
        for (index, &byte) in source[offset..].iter().enumerate() {
            let next = dfa.next_state(state, byte);
            if dfa.is_dead_state(next) || dfa.is_quit_state(next) {
                // A byte after a state that dies on every input did not influence the result.
                examined = Some(if is_final(dfa, state) { index } else { index + 1 });
                break;
            }
            state = next;
            if dfa.is_match_state(state) {
                // Matches are reported one byte late.
                self.record(dfa, state, index, valid, &mut best);
            }
        }
        let examined = match examined {
            Some(examined) => examined,
            None => {
                let remaining = source.len() - offset;
                let end_matters = !is_final(dfa, state);
                state = dfa.next_eoi_state(state);
                if dfa.is_match_state(state) {
                    self.record(dfa, state, remaining, valid, &mut best);
                }
                remaining + usize::from(end_matters)
            }
        };

        match best {
            Some((len, info)) => Lexeme::new(info.symbol, len, examined),
            None => {
                let len = char_len(source, offset);
                Lexeme::error(len, examined.max(len + 1))
            }
        }
    }

    fn record(
        &self,
        dfa: &dense::DFA<Vec<u32>>,
        state: StateID,
        len: usize,
        valid: &TerminalSet,
        best: &mut Option<(usize, PatternInfo)>,
    ) {
        if len == 0 {
            return;
        }
        for index in 0..dfa.match_len(state) {
            let Some(info) = self.patterns.get(dfa.match_pattern(state, index).as_usize()).copied() else {
                continue;
            };
            if !valid.contains(info.symbol) {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_len, best_info)) => len > *best_len || (len == *best_len && info.rank() < best_info.rank()),
            };
            if better {
                *best = Some((len, info));
            }
        }
    }
}

/// True if every byte leads to the dead state.
fn is_final(dfa: &dense::DFA<Vec<u32>>, state: StateID) -> bool {
    (0..=u8::MAX).all(|byte| dfa.is_dead_state(dfa.next_state(state, byte)))
}

impl TokenSource for TableLexer {
    fn next_token(&mut self, source: &[u8], offset: usize, valid: &TerminalSet) -> Lexeme {
        self.lex(source, offset, valid)
    }
}
