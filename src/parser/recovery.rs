//! Error recovery search.
//!
//! When every branch fails on a token, the parser asks for the ranked list of
//! [`Repair`]s that let it continue. Two kinds exist:
//!
//! - insert a zero-width missing terminal that makes the failing token valid;
//! - pop some stack entries and skip some tokens until a token in a bounded
//!   window is accepted.
//!
//! Candidates are ordered by [`RecoveryCost`] (fewest pops, then fewest skipped
//! tokens) and then by the `Ord` of [`Repair`], so the choice is a plain sort.

use crate::base::{StateId, SymbolId};
use crate::table::{Action, EOF, ERROR, ParseTable};

/// Upper bound on reductions while simulating one symbol. A well-formed table
/// never gets near it; a corrupt one must not hang the parser.
const MAX_SIMULATED_STEPS: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct RecoveryCost {
    pub pops: usize,
    pub skips: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) enum Repair {
    /// Insert a missing `symbol` before the failing token.
    InsertMissing { symbol: SymbolId },
    /// Pop `pops` counted entries, skip `skips` non-extra tokens and resume.
    Resync { pops: usize, skips: usize },
}

impl Repair {
    pub fn cost(&self) -> RecoveryCost {
        match *self {
            Self::InsertMissing { .. } => RecoveryCost { pops: 0, skips: 0 },
            Self::Resync { pops, skips } => RecoveryCost { pops, skips },
        }
    }

    /// Error cost charged to the branch that applies this repair.
    pub fn penalty(&self) -> u32 {
        match *self {
            Self::InsertMissing { .. } => 1,
            Self::Resync { pops, skips } => 1 + (pops + skips) as u32,
        }
    }
}

/// Run the automaton on `symbol` from `states`, following the first action of
/// every entry, until the symbol is shifted or accepted.
pub(super) fn simulate(table: &ParseTable, states: &mut Vec<StateId>, symbol: SymbolId) -> bool {
    for _ in 0..MAX_SIMULATED_STEPS {
        let Some(&state) = states.last() else {
            return false;
        };
        match table.lookup(state, symbol)[0] {
            Action::Shift { state } => {
                states.push(state);
                return true;
            }
            Action::Accept => return true,
            Action::Reduce { child_count, symbol: lhs, .. } => {
                let count = child_count as usize;
                if count >= states.len() {
                    return false;
                }
                states.truncate(states.len() - count);
                let Some(target) = states.last().and_then(|&top| table.goto(top, lhs)) else {
                    return false;
                };
                states.push(target);
            }
            Action::Error => return false,
        }
    }
    false
}

pub(super) fn accepts(table: &ParseTable, states: &[StateId], symbol: SymbolId) -> bool {
    simulate(table, &mut states.to_vec(), symbol)
}

/// Rank the repairs available on a stack whose counted states are `states`.
///
/// `window[0]` is the failing token's symbol and the rest are the non-extra
/// tokens after it, ending at [`EOF`] if the window reached it.
pub(super) fn candidates(
    table: &ParseTable,
    states: &[StateId],
    window: &[SymbolId],
    allow_missing: bool,
) -> Vec<Repair> {
    let mut repairs = Vec::new();
    let Some(&failing) = window.first() else {
        return repairs;
    };
    let Some(&top) = states.last() else {
        return repairs;
    };

    if allow_missing {
        for symbol in table.expected_terminals(top) {
            if symbol == EOF || symbol == ERROR || table.is_extra(symbol) {
                continue;
            }
            let mut after = states.to_vec();
            if simulate(table, &mut after, symbol) && simulate(table, &mut after, failing) {
                repairs.push(Repair::InsertMissing { symbol });
            }
        }
    }

    for (skips, &symbol) in window.iter().enumerate() {
        if symbol == ERROR {
            continue;
        }
        let start = usize::from(skips == 0);
        let pops = (start..states.len()).find(|&pops| accepts(table, &states[..states.len() - pops], symbol));
        if let Some(pops) = pops {
            repairs.push(Repair::Resync { pops, skips });
        }
    }

    repairs.sort_by_key(|repair| (repair.cost(), *repair));
    repairs
}
