//! Compiled grammar tables.
//!
//! A [`ParseTable`] is the immutable automaton the parser drives: for every parse
//! state it maps terminals to [`Action`]s and nonterminals to goto states. Entries
//! with more than one action are conflicts the grammar left unresolved; the parser
//! explores them by forking its stack.
//!
//! Tables are produced by [`crate::grammar`] or loaded from a blob with
//! [`ParseTable::from_blob`] and are never mutated afterwards.

mod blob;
mod terminal_set;

pub use blob::{TABLE_FORMAT, TABLE_VERSION};
pub use terminal_set::TerminalSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::{ProductionId, StateId, SymbolId};

/// End-of-input terminal. Always symbol 0.
pub const EOF: SymbolId = 0;

/// Error symbol. Always symbol 1; used for lexer error tokens and error nodes.
pub const ERROR: SymbolId = 1;

/// One entry in the action table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Consume the lookahead and move to `state`.
    Shift { state: StateId },
    /// Pop `child_count` entries and build a `symbol` node for `production`.
    Reduce { production: ProductionId, child_count: u16, symbol: SymbolId },
    /// The input is a complete sentence.
    Accept,
    /// No valid move.
    Error,
}

impl Action {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

const ERROR_ACTIONS: &[Action] = &[Action::Error];

/// How a terminal is recognized by the table-driven lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TerminalPattern {
    /// Exact text.
    Literal(String),
    /// A regular expression matched at the current offset.
    Regex(String),
    /// Produced by an external scanner; the table lexer never matches it.
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

/// Descriptive data for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMetadata {
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// Named symbols show up in s-expressions; anonymous literal tokens do not.
    pub named: bool,
    /// Hidden symbols (`_foo` rules, repeat helpers) are transparent in the tree API.
    pub visible: bool,
    /// Extras (whitespace, comments) may appear between any two tokens.
    #[serde(default)]
    pub extra: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<TerminalPattern>,
}

impl SymbolMetadata {
    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }
}

/// A production `lhs -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
}

/// Actions and gotos of one parse state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseState {
    pub lex_mode: u16,
    /// Sorted by symbol; every list is non-empty and free of `Action::Error`.
    pub actions: Vec<(SymbolId, Vec<Action>)>,
    /// Sorted by symbol.
    pub gotos: Vec<(SymbolId, StateId)>,
}

/// The immutable parse automaton of one grammar.
#[derive(Debug, Clone)]
pub struct ParseTable {
    pub(crate) name: SmolStr,
    pub(crate) symbols: Vec<SymbolMetadata>,
    pub(crate) terminal_count: usize,
    pub(crate) productions: Vec<Production>,
    pub(crate) states: Vec<ParseState>,
    pub(crate) lex_modes: Vec<TerminalSet>,
    pub(crate) extras: TerminalSet,
    pub(crate) start_state: StateId,
    pub(crate) context_sensitive: bool,
    by_name: FxHashMap<SmolStr, SymbolId>,
}

impl ParseTable {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: SmolStr,
        symbols: Vec<SymbolMetadata>,
        productions: Vec<Production>,
        states: Vec<ParseState>,
        lex_modes: Vec<TerminalSet>,
        start_state: StateId,
        context_sensitive: bool,
    ) -> Self {
        let terminal_count = symbols.iter().take_while(|s| s.is_terminal()).count();
        let extras = symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| s.extra)
            .map(|(id, _)| id as SymbolId)
            .collect();
        let mut by_name = FxHashMap::default();
        for (id, symbol) in symbols.iter().enumerate() {
            // First definition wins for duplicate display names.
            by_name.entry(symbol.name.clone()).or_insert(id as SymbolId);
        }
        Self {
            name,
            symbols,
            terminal_count,
            productions,
            states,
            lex_modes,
            extras,
            start_state,
            context_sensitive,
            by_name,
        }
    }

    /// Grammar name, e.g. `"cairo"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All candidate actions for `symbol` in `state`.
    ///
    /// Returns `[Action::Error]` when there is no entry. More than one element
    /// means the grammar left a conflict here and the parser must fork.
    pub fn lookup(&self, state: StateId, symbol: SymbolId) -> &[Action] {
        let Some(row) = self.states.get(state as usize) else {
            return ERROR_ACTIONS;
        };
        match row.actions.binary_search_by_key(&symbol, |(s, _)| *s) {
            Ok(index) => &row.actions[index].1,
            Err(_) => ERROR_ACTIONS,
        }
    }

    /// Goto target after reducing to `nonterminal` with `state` on top.
    pub fn goto(&self, state: StateId, nonterminal: SymbolId) -> Option<StateId> {
        let row = self.states.get(state as usize)?;
        row.gotos
            .binary_search_by_key(&nonterminal, |(s, _)| *s)
            .ok()
            .map(|index| row.gotos[index].1)
    }

    /// Terminals with at least one non-error action in `state`.
    pub fn expected_terminals(&self, state: StateId) -> impl Iterator<Item = SymbolId> + '_ {
        self.states
            .get(state as usize)
            .into_iter()
            .flat_map(|row| row.actions.iter().map(|(symbol, _)| *symbol))
    }

    /// Lex mode of a state.
    pub fn lex_mode(&self, state: StateId) -> u16 {
        self.states.get(state as usize).map(|s| s.lex_mode).unwrap_or(0)
    }

    /// The terminals the lexer may return in `state`.
    ///
    /// For context-free lexing this is every terminal; otherwise the state's lex
    /// mode (which always includes the extras).
    pub fn valid_terminals(&self, state: StateId) -> &TerminalSet {
        if !self.context_sensitive {
            return self.all_terminals();
        }
        &self.lex_modes[self.lex_mode(state) as usize]
    }

    /// Lex mode 0: every terminal.
    pub fn all_terminals(&self) -> &TerminalSet {
        &self.lex_modes[0]
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    pub fn is_context_sensitive(&self) -> bool {
        self.context_sensitive
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_count
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&SymbolMetadata> {
        self.symbols.get(id as usize)
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbol(id).map(|s| s.name.as_str()).unwrap_or("?")
    }

    /// Look a symbol up by name.
    pub fn symbol_for_name(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        (id as usize) < self.terminal_count
    }

    pub fn is_extra(&self, id: SymbolId) -> bool {
        self.extras.contains(id)
    }

    pub fn is_visible(&self, id: SymbolId) -> bool {
        self.symbol(id).is_some_and(|s| s.visible)
    }

    pub fn is_named(&self, id: SymbolId) -> bool {
        self.symbol(id).is_some_and(|s| s.named)
    }

    pub fn extras(&self) -> &TerminalSet {
        &self.extras
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub(crate) fn states(&self) -> &[ParseState] {
        &self.states
    }

    pub(crate) fn lex_modes(&self) -> &[TerminalSet] {
        &self.lex_modes
    }

    /// Number of entries holding more than one action.
    pub fn conflict_count(&self) -> usize {
        self.states
            .iter()
            .flat_map(|s| s.actions.iter())
            .filter(|(_, actions)| actions.len() > 1)
            .count()
    }
}
