//! Versioned serialized form of a [`ParseTable`].
//!
//! The blob is JSON with a fixed `format` tag and `version` number. Loading
//! checks both and then validates every index in the table, so a table that
//! loads successfully can be driven without bounds failures.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{Action, ERROR, ParseState, ParseTable, Production, SymbolKind, SymbolMetadata, TerminalSet};
use crate::base::StateId;
use crate::error::{Error, Result};

/// Format tag every table blob carries.
pub const TABLE_FORMAT: &str = "cairo-syntax/parse-table";

/// Current table schema version.
pub const TABLE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct TableBlob {
    format: String,
    version: u32,
    name: SmolStr,
    symbols: Vec<SymbolMetadata>,
    productions: Vec<Production>,
    states: Vec<ParseState>,
    lex_modes: Vec<TerminalSet>,
    start_state: StateId,
    #[serde(default)]
    context_sensitive: bool,
}

impl ParseTable {
    /// Serialize into the versioned blob format.
    pub fn to_blob(&self) -> Vec<u8> {
        let blob = TableBlob {
            format: TABLE_FORMAT.to_string(),
            version: TABLE_VERSION,
            name: self.name.clone(),
            symbols: self.symbols.clone(),
            productions: self.productions.clone(),
            states: self.states().to_vec(),
            lex_modes: self.lex_modes().to_vec(),
            start_state: self.start_state,
            context_sensitive: self.context_sensitive,
        };
        // Serializing plain structs of strings and integers cannot fail.
        serde_json::to_vec(&blob).unwrap_or_default()
    }

    /// Load a table from a blob, failing with [`Error::MalformedTable`] if the
    /// format, version or contents do not match what the engine expects.
    pub fn from_blob(bytes: &[u8]) -> Result<ParseTable> {
        let blob: TableBlob =
            serde_json::from_slice(bytes).map_err(|e| Error::malformed(format!("undecodable blob: {e}")))?;
        if blob.format != TABLE_FORMAT {
            return Err(Error::malformed(format!("unknown format tag `{}`", blob.format)));
        }
        if blob.version != TABLE_VERSION {
            return Err(Error::malformed(format!(
                "table version {} does not match engine version {TABLE_VERSION}",
                blob.version
            )));
        }
        validate(&blob)?;
        let table = ParseTable::new(
            blob.name,
            blob.symbols,
            blob.productions,
            blob.states,
            blob.lex_modes,
            blob.start_state,
            blob.context_sensitive,
        );
        tracing::debug!(
            name = table.name(),
            states = table.state_count(),
            symbols = table.symbol_count(),
            "loaded parse table"
        );
        Ok(table)
    }
}

fn validate(blob: &TableBlob) -> Result<()> {
    let symbol_count = blob.symbols.len();
    let terminal_count = blob.symbols.iter().take_while(|s| s.kind == SymbolKind::Terminal).count();
    if blob.symbols[terminal_count..].iter().any(|s| s.kind == SymbolKind::Terminal) {
        return Err(Error::malformed("terminals must precede nonterminals"));
    }
    if terminal_count <= ERROR as usize {
        return Err(Error::malformed("missing reserved end and error terminals"));
    }
    if blob.states.is_empty() || blob.start_state as usize >= blob.states.len() {
        return Err(Error::malformed("start state out of range"));
    }
    if blob.lex_modes.first() != Some(&TerminalSet::full(terminal_count)) {
        return Err(Error::malformed("lex mode 0 must contain every terminal"));
    }
    let is_terminal = |id: u16| (id as usize) < terminal_count;
    let is_nonterminal = |id: u16| (id as usize) >= terminal_count && (id as usize) < symbol_count;

    for (index, production) in blob.productions.iter().enumerate() {
        if !is_nonterminal(production.lhs) {
            return Err(Error::malformed(format!("production {index} has a terminal left-hand side")));
        }
        if production.rhs.iter().any(|s| *s as usize >= symbol_count) {
            return Err(Error::malformed(format!("production {index} references an unknown symbol")));
        }
    }
    for mode in &blob.lex_modes {
        if mode.iter().any(|s| !is_terminal(s)) {
            return Err(Error::malformed("lex mode contains a nonterminal"));
        }
    }
    for (index, state) in blob.states.iter().enumerate() {
        if state.lex_mode as usize >= blob.lex_modes.len() {
            return Err(Error::malformed(format!("state {index} has an unknown lex mode")));
        }
        if !state.actions.windows(2).all(|w| w[0].0 < w[1].0) || !state.gotos.windows(2).all(|w| w[0].0 < w[1].0) {
            return Err(Error::malformed(format!("state {index} entries are not sorted")));
        }
        for (symbol, actions) in &state.actions {
            if !is_terminal(*symbol) || actions.is_empty() {
                return Err(Error::malformed(format!("state {index} has an invalid action entry")));
            }
            for action in actions {
                let valid = match *action {
                    Action::Shift { state } => (state as usize) < blob.states.len(),
                    Action::Reduce { production, child_count, symbol } => blob
                        .productions
                        .get(production as usize)
                        .is_some_and(|p| p.lhs == symbol && p.rhs.len() == child_count as usize),
                    Action::Accept => true,
                    Action::Error => false,
                };
                if !valid {
                    return Err(Error::malformed(format!("state {index} has an invalid action {action:?}")));
                }
            }
        }
        for (symbol, target) in &state.gotos {
            if !is_nonterminal(*symbol) || *target as usize >= blob.states.len() {
                return Err(Error::malformed(format!("state {index} has an invalid goto")));
            }
        }
    }
    Ok(())
}
