//! The generalized LR driver.
//!
//! Parsing proceeds in rounds, one per lookahead token. Every live [`Head`] at
//! the lowest source position takes the token: it reduces as long as the table
//! says so, then shifts, accepts or fails. A table entry with several actions
//! clones the head once per extra action. After the round, heads that reached
//! the same stack configuration are merged (keeping the best ranked one) and
//! the rest are capped at the configured branch limit. When no head survives a
//! round, the best failed head is repaired by error recovery.
//!
//! Before lexing, a lone head first tries to push whole subtrees of the
//! previous tree (see [`ReuseCursor`]). The first parse error of a reparse
//! drops the old tree and starts over, so recovery never sees reused nodes.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;

use super::ParserConfig;
use super::recovery::{self, Repair};
use super::reuse::{ReuseCursor, is_reusable};
use super::stack::Head;
use crate::base::{Length, ProductionId, StateId, SymbolId};
use crate::error::{Error, Result};
use crate::lexer::{LexerAdapter, Token};
use crate::syntax::{GreenNode, NodeCache, NodeFlags, finish_root};
use crate::table::{Action, EOF, ParseTable};

/// Upper bound on reductions between two shifts of one head.
const MAX_REDUCTIONS: usize = 4096;

enum Step {
    Shifted,
    Accepted,
    Failed,
}

#[derive(Default)]
struct Round {
    shifted: Vec<Head>,
    accepted: Vec<Head>,
    failed: Vec<(Head, Token)>,
}

enum Recovered {
    Continue(Head),
    Finished(GreenNode),
}

pub(super) struct Driver<'a> {
    table: &'a ParseTable,
    config: &'a ParserConfig,
    cancel: Option<&'a CancellationToken>,
    lexer: LexerAdapter<'a>,
    cache: NodeCache,
    reuse: Option<ReuseCursor>,
    reused: usize,
}

impl<'a> Driver<'a> {
    pub fn new(
        table: &'a ParseTable,
        config: &'a ParserConfig,
        cancel: Option<&'a CancellationToken>,
        lexer: LexerAdapter<'a>,
        seed: Option<&GreenNode>,
    ) -> Self {
        Self {
            table,
            config,
            cancel,
            lexer,
            cache: NodeCache::new(),
            reuse: seed.map(ReuseCursor::new),
            reused: 0,
        }
    }

    /// Parse the whole source and return the root node.
    pub fn run(mut self) -> Result<GreenNode> {
        let mut heads = vec![Head::new(self.table.start_state())];
        loop {
            if self.cancel.is_some_and(CancellationToken::is_cancelled) {
                tracing::debug!(position = self.lexer_position(&heads), "parse cancelled");
                return Err(Error::Cancelled);
            }

            if let [head] = heads.as_mut_slice() {
                self.reuse_nodes(head);
            }

            let position = self.lexer_position(&heads);
            let total = heads.len();
            let (active, waiting): (Vec<Head>, Vec<Head>) =
                heads.into_iter().partition(|head| head.position().offset() == position);
            let round = self.round(active, total > 1);

            if let Some(best) = round.accepted.into_iter().min_by(|a, b| a.rank().cmp(&b.rank())) {
                let root = self.finish(best);
                tracing::debug!(
                    bytes = self.lexer.source().len(),
                    reused = self.reused,
                    cache_hits = self.cache.hits(),
                    error_cost = root.error_cost(),
                    "parse finished"
                );
                return Ok(root);
            }

            let mut survivors = round.shifted;
            survivors.extend(waiting);
            if survivors.is_empty() {
                if self.reuse.take().is_some() {
                    // Reused subtrees change the stack layout that repairs are
                    // ranked on, so recovery always runs on a fresh stack.
                    tracing::debug!(
                        position,
                        reused = self.reused,
                        "parse error while reusing the old tree; restarting without it"
                    );
                    self.reused = 0;
                    heads = vec![Head::new(self.table.start_state())];
                    continue;
                }
                let best = round.failed.into_iter().min_by(|(a, _), (b, _)| a.rank().cmp(&b.rank()));
                let Some((head, token)) = best else {
                    return Ok(GreenNode::error(Vec::new(), self.table.start_state(), 0));
                };
                match self.recover(head, &token) {
                    Recovered::Continue(head) => survivors.push(head),
                    Recovered::Finished(root) => return Ok(root),
                }
            }
            heads = self.merge(survivors);
        }
    }

    fn lexer_position(&self, heads: &[Head]) -> usize {
        heads.iter().map(|head| head.position().offset()).min().unwrap_or(0)
    }

    /// Feed one lookahead token to every active head.
    fn round(&mut self, active: Vec<Head>, crowded: bool) -> Round {
        let mut tokens: Vec<(u16, Token)> = Vec::new();
        let mut work: VecDeque<(Head, Option<usize>)> = active.into_iter().map(|head| (head, None)).collect();
        let mut round = Round::default();
        while let Some((mut head, forced)) = work.pop_front() {
            let token = self.token_for(&head, &mut tokens);
            match self.advance(&mut head, &token, forced, crowded, &mut work) {
                Step::Shifted => round.shifted.push(head),
                Step::Accepted => round.accepted.push(head),
                Step::Failed => {
                    tracing::trace!(state = head.state(), symbol = token.symbol, "parse branch failed");
                    round.failed.push((head, token));
                }
            }
        }
        round
    }

    /// The lookahead token for `head`. Heads sharing a lex mode share a token.
    fn token_for(&mut self, head: &Head, tokens: &mut Vec<(u16, Token)>) -> Token {
        let table = self.table;
        let mode = if table.is_context_sensitive() { table.lex_mode(head.state()) } else { 0 };
        if let Some((_, token)) = tokens.iter().find(|(m, _)| *m == mode) {
            return *token;
        }
        let token = self.lexer.lex(head.position(), table.valid_terminals(head.state()));
        tokens.push((mode, token));
        token
    }

    fn advance(
        &mut self,
        head: &mut Head,
        token: &Token,
        mut forced: Option<usize>,
        crowded: bool,
        forks: &mut VecDeque<(Head, Option<usize>)>,
    ) -> Step {
        let table = self.table;
        for _ in 0..MAX_REDUCTIONS {
            let actions = table.lookup(head.state(), token.symbol);
            if actions[0].is_error() {
                if table.is_extra(token.symbol) && !token.is_eof() {
                    let leaf = self.leaf(head, token, NodeFlags::EXTRA, crowded);
                    head.push_uncounted(leaf);
                    return Step::Shifted;
                }
                return Step::Failed;
            }

            let index = match forced.take() {
                Some(index) => index,
                None => {
                    if actions.len() > 1 {
                        for index in 1..actions.len() {
                            let mut fork = head.clone();
                            fork.split = true;
                            fork.choices.push(index as u16);
                            forks.push_back((fork, Some(index)));
                        }
                        head.split = true;
                        head.choices.push(0);
                        tracing::trace!(
                            state = head.state(),
                            symbol = %table.symbol_name(token.symbol),
                            branches = actions.len(),
                            "forked parse"
                        );
                    }
                    0
                }
            };

            match actions.get(index).copied().unwrap_or(Action::Error) {
                Action::Shift { state } => {
                    let leaf = self.leaf(head, token, NodeFlags::NONE, crowded);
                    head.push(state, leaf);
                    head.missing_run = 0;
                    return Step::Shifted;
                }
                Action::Reduce { production, child_count, symbol } => {
                    let fragile = crowded || head.split;
                    if !self.reduce(head, production, child_count as usize, symbol, token.reach(), fragile) {
                        return Step::Failed;
                    }
                }
                Action::Accept => return Step::Accepted,
                Action::Error => return Step::Failed,
            }
        }
        Step::Failed
    }

    fn leaf(&self, head: &Head, token: &Token, flags: NodeFlags, crowded: bool) -> GreenNode {
        let flags = if crowded || head.split { flags | NodeFlags::FRAGILE } else { flags };
        GreenNode::token(token.symbol, token.len, token.lookahead, head.state(), flags)
    }

    /// Reduce `count` children into a `symbol` node and take the goto.
    ///
    /// `reach` is the absolute offset up to which the decision to reduce looked.
    fn reduce(
        &mut self,
        head: &mut Head,
        production: ProductionId,
        count: usize,
        symbol: SymbolId,
        reach: usize,
        fragile: bool,
    ) -> bool {
        let Some((children, trailing)) = head.pop_for_reduce(count) else {
            return false;
        };
        let state = head.state();
        let Some(target) = self.table.goto(state, symbol) else {
            return false;
        };

        let mut end = head.position();
        let mut furthest = reach;
        for child in &children {
            end = end + child.length();
            furthest = furthest.max(end.offset() + child.lookahead() as usize);
        }
        let lookahead = furthest.saturating_sub(end.offset()) as u32;
        let flags = if fragile { NodeFlags::FRAGILE } else { NodeFlags::NONE };

        let node = self.cache.node(symbol, production, state, children, lookahead, flags);
        head.push(target, node);
        head.restore(trailing);
        true
    }

    /// Push subtrees of the previous tree that start at the head's position.
    fn reuse_nodes(&mut self, head: &mut Head) {
        let Some(mut cursor) = self.reuse.take() else {
            return;
        };
        let table = self.table;
        let mut reductions = 0;
        while reductions < MAX_REDUCTIONS {
            let position = head.position();
            let Some(node) = cursor.peek(position, &mut self.cache).cloned() else {
                break;
            };
            if !is_reusable(&node) {
                if node.is_leaf() {
                    break;
                }
                cursor.descend(&mut self.cache);
                continue;
            }

            let state = head.state();
            let state_matches = node.state() == state || (node.is_leaf() && !table.is_context_sensitive());
            if node.is_extra() {
                if !state_matches {
                    break;
                }
                head.push_uncounted(node);
                cursor.advance();
                self.reused += 1;
                continue;
            }

            let first = node.first_leaf();
            if let [Action::Reduce { production, child_count, symbol }] = *table.lookup(state, first.symbol()) {
                if table.is_context_sensitive() {
                    break;
                }
                let reach = position.offset() + first.length().offset() + first.lookahead() as usize;
                if !self.reduce(head, production, child_count as usize, symbol, reach, false) {
                    break;
                }
                reductions += 1;
                continue;
            }

            if state_matches {
                if let Some(target) = self.reuse_target(state, &node) {
                    tracing::trace!(
                        symbol = %table.symbol_name(node.symbol()),
                        start = position.offset(),
                        bytes = node.length().offset(),
                        "reused node"
                    );
                    head.push(target, node);
                    cursor.advance();
                    self.reused += 1;
                    reductions = 0;
                    continue;
                }
            }
            if node.is_leaf() || !cursor.descend(&mut self.cache) {
                break;
            }
        }
        self.reuse = Some(cursor);
    }

    /// State after pushing a reused `node` in `state`, if the table allows it
    /// without a conflict.
    fn reuse_target(&self, state: StateId, node: &GreenNode) -> Option<StateId> {
        if self.table.is_terminal(node.symbol()) {
            match *self.table.lookup(state, node.symbol()) {
                [Action::Shift { state }] => Some(state),
                _ => None,
            }
        } else {
            self.table.goto(state, node.symbol())
        }
    }

    /// Drop heads that converged on the same stack and cap the branch count.
    fn merge(&self, mut heads: Vec<Head>) -> Vec<Head> {
        heads.sort_by(|a, b| a.rank().cmp(&b.rank()));
        let before = heads.len();
        let mut seen = FxHashSet::default();
        heads.retain(|head| seen.insert((head.position().offset(), head.signature())));
        heads.truncate(self.config.max_branches.max(1));
        if heads.len() < before {
            tracing::trace!(before, after = heads.len(), "merged parse branches");
        }
        for head in &mut heads {
            head.split = false;
        }
        heads
    }

    /// Splice the accepted stack into a root node.
    fn finish(&self, head: Head) -> GreenNode {
        let mut nodes = head.into_nodes();
        let Some(index) = nodes.iter().rposition(|node| !node.is_extra() && !node.is_error()) else {
            return GreenNode::error(nodes, self.table.start_state(), 0);
        };
        let after = nodes.split_off(index + 1);
        match nodes.pop() {
            Some(root) => finish_root(root, nodes, after),
            None => GreenNode::error(after, self.table.start_state(), 0),
        }
    }

    fn recover(&mut self, mut head: Head, failed: &Token) -> Recovered {
        let table = self.table;
        let window = self.window(failed.start);
        let sync: Vec<&Token> = window.iter().filter(|token| !table.is_extra(token.symbol)).collect();
        let symbols: Vec<SymbolId> = sync.iter().map(|token| token.symbol).collect();
        let allow_missing = head.missing_run < self.config.max_missing;
        let repairs = recovery::candidates(table, &head.counted_states(), &symbols, allow_missing);

        let Some(&repair) = repairs.first() else {
            return self.skip_to_end(head, failed.start);
        };
        tracing::debug!(
            position = failed.start.offset(),
            symbol = %table.symbol_name(failed.symbol),
            ?repair,
            candidates = repairs.len(),
            "recovering from parse error"
        );
        head.error_cost += repair.penalty();
        match repair {
            Repair::InsertMissing { symbol } => {
                self.insert_missing(&mut head, symbol, failed.reach());
                head.missing_run += 1;
            }
            Repair::Resync { pops, skips } => {
                let resume = sync.get(skips).map_or(failed.start, |token| token.start);
                let state = head.state();
                let skipped: Vec<GreenNode> = window
                    .iter()
                    .take_while(|token| token.start.offset() < resume.offset())
                    .map(|token| self.skipped_leaf(token, state))
                    .collect();
                let mut children = head.pop_counted(pops);
                children.extend(skipped);
                let error = GreenNode::error(children, head.state(), skips as u32);
                head.push_uncounted(error);
            }
        }
        Recovered::Continue(head)
    }

    /// Lex up to `recovery_window` non-extra tokens from `from`, context-free.
    fn window(&mut self, from: Length) -> Vec<Token> {
        let table = self.table;
        let limit = self.config.recovery_window.max(1);
        let mut tokens = Vec::new();
        let mut sync = 0;
        let mut at = from;
        loop {
            let token = self.lexer.lex(at, table.all_terminals());
            tokens.push(token);
            if token.is_eof() {
                break;
            }
            if !table.is_extra(token.symbol) {
                sync += 1;
                if sync >= limit {
                    break;
                }
            }
            at = token.end();
        }
        tokens
    }

    fn skipped_leaf(&self, token: &Token, state: StateId) -> GreenNode {
        let flags = if self.table.is_extra(token.symbol) { NodeFlags::EXTRA } else { NodeFlags::NONE };
        GreenNode::token(token.symbol, token.len, token.lookahead, state, flags | NodeFlags::FRAGILE)
    }

    /// Perform the reductions `symbol` triggers and push it as a missing leaf.
    fn insert_missing(&mut self, head: &mut Head, symbol: SymbolId, reach: usize) {
        let table = self.table;
        for _ in 0..MAX_REDUCTIONS {
            match table.lookup(head.state(), symbol)[0] {
                Action::Reduce { production, child_count, symbol: lhs } => {
                    if !self.reduce(head, production, child_count as usize, lhs, reach, true) {
                        return;
                    }
                }
                Action::Shift { state } => {
                    let missing = GreenNode::missing(symbol, head.state());
                    head.push(state, missing);
                    return;
                }
                Action::Accept | Action::Error => return,
            }
        }
    }

    /// Last resort: wrap the rest of the input in one error node.
    fn skip_to_end(&mut self, mut head: Head, from: Length) -> Recovered {
        let table = self.table;
        let state = head.state();
        let mut leaves = Vec::new();
        let mut at = from;
        loop {
            let token = self.lexer.lex(at, table.all_terminals());
            if token.is_eof() {
                break;
            }
            leaves.push(self.skipped_leaf(&token, state));
            at = token.end();
        }
        let skipped = leaves.iter().filter(|leaf| !leaf.is_extra()).count() as u32;
        let states = head.counted_states();
        let pops = (0..states.len())
            .find(|&pops| (pops > 0 || !leaves.is_empty()) && recovery::accepts(table, &states[..states.len() - pops], EOF));
        tracing::debug!(position = from.offset(), skipped, ?pops, "skipping to end of input");

        match pops {
            Some(pops) => {
                let mut children = head.pop_counted(pops);
                children.extend(leaves);
                let error = GreenNode::error(children, head.state(), skipped);
                head.error_cost += 1 + pops as u32 + skipped;
                head.push_uncounted(error);
                Recovered::Continue(head)
            }
            None => {
                let mut children = head.into_nodes();
                children.extend(leaves);
                Recovered::Finished(GreenNode::error(children, table.start_state(), skipped))
            }
        }
    }
}
