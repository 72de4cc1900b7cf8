//! LALR(1) table construction.
//!
//! LR(0) kernels are built first; lookaheads are then computed by the classic
//! spontaneous-generation / propagation scheme and turned into actions. Conflicts
//! are resolved by production precedence and associativity where both sides
//! declare one; the rest stay in the table as candidate lists ordered by rank
//! (the lowest production index involved), so the first-listed rule comes first.

use std::cmp::Ordering;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::{Assoc, LoweredGrammar, Precedence};
use crate::base::{StateId, SymbolId};
use crate::error::{Error, Result};
use crate::table::{Action, EOF, ParseState, ParseTable, Production, TerminalSet};

/// `(production, dot)`
type Item = (usize, usize);

struct Automaton<'g> {
    grammar: &'g LoweredGrammar,
    /// Real productions followed by the augmented `S' -> S`.
    productions: Vec<(SymbolId, Vec<SymbolId>, Option<Precedence>)>,
    augmented: usize,
    by_lhs: Vec<Vec<usize>>,
    nullable: Vec<bool>,
    first: Vec<TerminalSet>,
    /// Placeholder lookahead used while discovering propagation edges.
    dummy: SymbolId,
    closure_cache: FxHashMap<Item, Vec<(Item, TerminalSet)>>,
}

pub(super) fn construct(name: &SmolStr, grammar: LoweredGrammar, context_sensitive: bool) -> Result<ParseTable> {
    let automaton = Automaton::new(&grammar);
    let states = automaton.build_states()?;
    let symbols = grammar.symbols.clone();
    let productions = grammar
        .productions
        .iter()
        .map(|p| Production { lhs: p.lhs, rhs: p.rhs.clone() })
        .collect();
    let (states, lex_modes) = states;
    Ok(ParseTable::new(name.clone(), symbols, productions, states, lex_modes, 0, context_sensitive))
}

impl<'g> Automaton<'g> {
    fn new(grammar: &'g LoweredGrammar) -> Self {
        let symbol_count = grammar.symbols.len();
        let augmented_lhs = symbol_count as SymbolId;
        let mut productions: Vec<_> =
            grammar.productions.iter().map(|p| (p.lhs, p.rhs.clone(), p.precedence)).collect();
        let augmented = productions.len();
        productions.push((augmented_lhs, vec![grammar.start], None));

        let mut by_lhs = vec![Vec::new(); symbol_count + 1];
        for (index, (lhs, _, _)) in productions.iter().enumerate() {
            by_lhs[*lhs as usize].push(index);
        }

        let mut automaton = Self {
            grammar,
            productions,
            augmented,
            by_lhs,
            nullable: vec![false; symbol_count + 1],
            first: vec![TerminalSet::new(); symbol_count + 1],
            dummy: grammar.terminal_count as SymbolId,
            closure_cache: FxHashMap::default(),
        };
        automaton.compute_first_sets();
        automaton
    }

    fn is_terminal(&self, symbol: SymbolId) -> bool {
        (symbol as usize) < self.grammar.terminal_count
    }

    fn compute_first_sets(&mut self) {
        for terminal in 0..self.grammar.terminal_count {
            self.first[terminal].insert(terminal as SymbolId);
        }
        let mut changed = true;
        while changed {
            changed = false;
            for (lhs, rhs, _) in &self.productions {
                let lhs = *lhs as usize;
                let mut all_nullable = true;
                for &symbol in rhs {
                    let first = self.first[symbol as usize].clone();
                    changed |= self.first[lhs].union_with(&first);
                    if !self.nullable[symbol as usize] {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
    }

    fn next_symbol(&self, (production, dot): Item) -> Option<SymbolId> {
        self.productions[production].1.get(dot).copied()
    }

    /// FIRST(sequence · lookahead)
    fn first_of(&self, sequence: &[SymbolId], lookahead: &TerminalSet) -> TerminalSet {
        let mut result = TerminalSet::new();
        for &symbol in sequence {
            result.union_with(&self.first[symbol as usize]);
            if !self.nullable[symbol as usize] {
                return result;
            }
        }
        result.union_with(lookahead);
        result
    }

    fn closure_lr0(&self, kernel: &[Item]) -> IndexSet<Item> {
        let mut items: IndexSet<Item> = kernel.iter().copied().collect();
        let mut index = 0;
        while index < items.len() {
            let item = items[index];
            index += 1;
            if let Some(symbol) = self.next_symbol(item).filter(|s| !self.is_terminal(*s)) {
                for &production in &self.by_lhs[symbol as usize] {
                    items.insert((production, 0));
                }
            }
        }
        items
    }

    fn closure_lr1(&self, seed: Vec<(Item, TerminalSet)>) -> IndexMap<Item, TerminalSet> {
        let mut items: IndexMap<Item, TerminalSet> = IndexMap::new();
        for (item, lookahead) in seed {
            items.entry(item).or_default().union_with(&lookahead);
        }
        let mut work: Vec<usize> = (0..items.len()).collect();
        while let Some(index) = work.pop() {
            let (&(production, dot), lookahead) = match items.get_index(index) {
                Some(entry) => entry,
                None => continue,
            };
            let Some(symbol) = self.next_symbol((production, dot)).filter(|s| !self.is_terminal(*s)) else {
                continue;
            };
            let follow = self.first_of(&self.productions[production].1[dot + 1..], lookahead);
            for &child in &self.by_lhs[symbol as usize] {
                let key = (child, 0);
                match items.get_index_of(&key) {
                    Some(existing) => {
                        if items[existing].union_with(&follow) {
                            work.push(existing);
                        }
                    }
                    None => {
                        let (inserted, _) = items.insert_full(key, follow.clone());
                        work.push(inserted);
                    }
                }
            }
        }
        items
    }

    /// Closure of a single kernel item with the placeholder lookahead, cached per item.
    fn closure_of_kernel_item(&mut self, item: Item) -> Vec<(Item, TerminalSet)> {
        if let Some(cached) = self.closure_cache.get(&item) {
            return cached.clone();
        }
        let seed = vec![(item, std::iter::once(self.dummy).collect())];
        let closure: Vec<_> = self.closure_lr1(seed).into_iter().collect();
        self.closure_cache.insert(item, closure.clone());
        closure
    }

    fn build_states(mut self) -> Result<(Vec<ParseState>, Vec<TerminalSet>)> {
        // LR(0) kernels and transitions.
        let mut kernels: IndexSet<Vec<Item>> = IndexSet::new();
        kernels.insert(vec![(self.augmented, 0)]);
        let mut transitions: Vec<Vec<(SymbolId, usize)>> = Vec::new();
        let mut index = 0;
        while index < kernels.len() {
            let closure = self.closure_lr0(&kernels[index]);
            let mut successors: IndexMap<SymbolId, Vec<Item>> = IndexMap::new();
            for &item in &closure {
                if let Some(symbol) = self.next_symbol(item) {
                    successors.entry(symbol).or_default().push((item.0, item.1 + 1));
                }
            }
            let mut edges = Vec::with_capacity(successors.len());
            for (symbol, mut kernel) in successors {
                kernel.sort_unstable();
                kernel.dedup();
                let (target, _) = kernels.insert_full(kernel);
                edges.push((symbol, target));
            }
            edges.sort_unstable();
            transitions.push(edges);
            index += 1;
        }
        if kernels.len() > StateId::MAX as usize {
            return Err(Error::grammar(format!("grammar needs {} states", kernels.len())));
        }
        let transition = |state: usize, symbol: SymbolId| -> Option<usize> {
            transitions[state]
                .binary_search_by_key(&symbol, |(s, _)| *s)
                .ok()
                .map(|i| transitions[state][i].1)
        };

        // Lookahead discovery: spontaneous sets and propagation edges.
        let mut lookaheads: Vec<Vec<TerminalSet>> =
            kernels.iter().map(|kernel| vec![TerminalSet::new(); kernel.len()]).collect();
        lookaheads[0][0].insert(EOF);
        let mut propagation: FxHashMap<(usize, usize), Vec<(usize, usize)>> = FxHashMap::default();
        for state in 0..kernels.len() {
            for kernel_index in 0..kernels[state].len() {
                let kernel_item = kernels[state][kernel_index];
                for (item, set) in self.closure_of_kernel_item(kernel_item) {
                    let Some(symbol) = self.next_symbol(item) else { continue };
                    let Some(target) = transition(state, symbol) else { continue };
                    let advanced = (item.0, item.1 + 1);
                    let Ok(target_index) = kernels[target].binary_search(&advanced) else { continue };
                    for terminal in set.iter().filter(|t| *t != self.dummy) {
                        lookaheads[target][target_index].insert(terminal);
                    }
                    if set.contains(self.dummy) {
                        propagation.entry((state, kernel_index)).or_default().push((target, target_index));
                    }
                }
            }
        }
        let mut changed = true;
        while changed {
            changed = false;
            for (&(state, kernel_index), targets) in &propagation {
                let source = lookaheads[state][kernel_index].clone();
                for &(target, target_index) in targets {
                    changed |= lookaheads[target][target_index].union_with(&source);
                }
            }
        }

        // Actions, gotos and lex modes.
        let terminal_count = self.grammar.terminal_count;
        let extras: TerminalSet =
            self.grammar.symbols.iter().enumerate().filter(|(_, s)| s.extra).map(|(i, _)| i as SymbolId).collect();
        let mut lex_modes: IndexSet<TerminalSet> = IndexSet::new();
        lex_modes.insert(TerminalSet::full(terminal_count));

        let mut states = Vec::with_capacity(kernels.len());
        let mut conflicts = 0usize;
        for (state, kernel) in kernels.iter().enumerate() {
            let seed = kernel.iter().copied().zip(lookaheads[state].iter().cloned()).collect();
            let closure = self.closure_lr1(seed);

            let mut shifts: IndexMap<SymbolId, Vec<usize>> = IndexMap::new();
            let mut reduces: IndexMap<SymbolId, Vec<usize>> = IndexMap::new();
            let mut accepts = false;
            for (&item, lookahead) in &closure {
                match self.next_symbol(item) {
                    Some(symbol) if self.is_terminal(symbol) => shifts.entry(symbol).or_default().push(item.0),
                    Some(_) => {}
                    None if item.0 == self.augmented => accepts |= lookahead.contains(EOF),
                    None => {
                        for terminal in lookahead.iter() {
                            reduces.entry(terminal).or_default().push(item.0);
                        }
                    }
                }
            }

            let mut terminals: Vec<SymbolId> = shifts.keys().chain(reduces.keys()).copied().collect();
            if accepts {
                terminals.push(EOF);
            }
            terminals.sort_unstable();
            terminals.dedup();

            let mut actions = Vec::with_capacity(terminals.len());
            for terminal in terminals {
                let shift = shifts.get(&terminal).and_then(|items| {
                    let target = transition(state, terminal)?;
                    Some((target, items.as_slice()))
                });
                let candidates = self.resolve(
                    shift,
                    reduces.get(&terminal).map(Vec::as_slice).unwrap_or(&[]),
                    accepts && terminal == EOF,
                );
                if candidates.len() > 1 {
                    conflicts += 1;
                }
                if !candidates.is_empty() {
                    actions.push((terminal, candidates));
                }
            }

            let gotos: Vec<(SymbolId, StateId)> = transitions[state]
                .iter()
                .filter(|(symbol, _)| !self.is_terminal(*symbol))
                .map(|(symbol, target)| (*symbol, *target as StateId))
                .collect();

            let mut valid: TerminalSet = actions.iter().map(|(terminal, _)| *terminal).collect();
            valid.union_with(&extras);
            let (lex_mode, _) = lex_modes.insert_full(valid);

            states.push(ParseState { lex_mode: lex_mode as u16, actions, gotos });
        }
        if conflicts > 0 {
            tracing::debug!(conflicts, "grammar keeps unresolved conflicts for generalized parsing");
        }
        Ok((states, lex_modes.into_iter().collect()))
    }

    /// Combine the shift, reduce and accept candidates of one table cell.
    ///
    /// `shift` is the target state plus the productions whose items shift the
    /// terminal. The result is ordered by rank: accept first, then by the lowest
    /// production index each candidate came from.
    fn resolve(&self, shift: Option<(usize, &[usize])>, reduces: &[usize], accept: bool) -> Vec<Action> {
        let shift_prec = shift.and_then(|(_, items)| {
            items.iter().filter_map(|&p| self.productions[p].2).map(|p| p.value).max()
        });

        let mut keep_shift = shift.is_some();
        let mut kept: Vec<usize> = Vec::with_capacity(reduces.len());
        for &production in reduces {
            let (Some(reduce), Some(shift_value)) = (self.productions[production].2, shift_prec) else {
                kept.push(production);
                continue;
            };
            match reduce.value.cmp(&shift_value) {
                Ordering::Greater => {
                    keep_shift = false;
                    kept.push(production);
                }
                Ordering::Less => {}
                Ordering::Equal => match reduce.assoc {
                    Assoc::Left => {
                        keep_shift = false;
                        kept.push(production);
                    }
                    Assoc::Right => {}
                    Assoc::None => kept.push(production),
                },
            }
        }

        // Reduce/reduce: a strictly higher precedence wins when every candidate declares one.
        if kept.len() > 1 && kept.iter().all(|&p| self.productions[p].2.is_some()) {
            let best = kept.iter().filter_map(|&p| self.productions[p].2).map(|p| p.value).max();
            kept.retain(|&p| self.productions[p].2.map(|p| p.value) == best);
        }

        let mut ranked: Vec<(usize, Action)> = Vec::with_capacity(kept.len() + 2);
        if accept {
            ranked.push((0, Action::Accept));
        }
        if let Some((target, items)) = shift.filter(|_| keep_shift) {
            let rank = items.iter().copied().min().unwrap_or(usize::MAX);
            ranked.push((rank + 1, Action::Shift { state: target as StateId }));
        }
        for production in kept {
            let (lhs, rhs, _) = &self.productions[production];
            ranked.push((
                production + 1,
                Action::Reduce { production: production as u16, child_count: rhs.len() as u16, symbol: *lhs },
            ));
        }
        // Stable: a shift and a reduce of the same production keep shift first.
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, action)| action).collect()
    }
}
