//! Parse stacks.
//!
//! Each live branch of a generalized parse is a [`Head`]: a stack of states and
//! the nodes shifted or reduced onto it. Extras and error nodes sit on the
//! stack without changing the state, so they are "uncounted": reductions pop a
//! number of counted entries and carry any uncounted ones along.

use crate::base::{Length, StateId};
use crate::syntax::GreenNode;

#[derive(Debug, Clone)]
pub(super) struct StackEntry {
    pub state: StateId,
    /// `None` only for the bottom entry.
    pub node: Option<GreenNode>,
    /// Source position after this entry.
    pub end: Length,
}

impl StackEntry {
    fn is_counted(&self) -> bool {
        self.node.as_ref().is_some_and(|node| !node.is_extra() && !node.is_error())
    }
}

/// One branch of the parse.
#[derive(Debug, Clone)]
pub(super) struct Head {
    entries: Vec<StackEntry>,
    /// Accumulated cost of the repairs made on this branch.
    pub error_cost: u32,
    /// Index of the action taken at every conflict, in order.
    pub choices: Vec<u16>,
    /// Missing nodes inserted since the last real shift.
    pub missing_run: u32,
    /// Set when this branch forked during the current round.
    pub split: bool,
}

impl Head {
    pub fn new(start_state: StateId) -> Self {
        Self {
            entries: vec![StackEntry { state: start_state, node: None, end: Length::ZERO }],
            error_cost: 0,
            choices: Vec::new(),
            missing_run: 0,
            split: false,
        }
    }

    pub fn state(&self) -> StateId {
        self.top().state
    }

    pub fn position(&self) -> Length {
        self.top().end
    }

    fn top(&self) -> &StackEntry {
        // The bottom entry is never popped.
        &self.entries[self.entries.len() - 1]
    }

    /// Ranking key when several branches compete: cheaper repairs first, then
    /// earlier-listed conflict choices.
    pub fn rank(&self) -> (u32, &[u16]) {
        (self.error_cost, &self.choices)
    }

    pub fn push(&mut self, state: StateId, node: GreenNode) {
        let end = self.position() + node.length();
        self.entries.push(StackEntry { state, node: Some(node), end });
    }

    /// Push an extra or error node without leaving the current state.
    pub fn push_uncounted(&mut self, node: GreenNode) {
        let state = self.state();
        self.push(state, node);
    }

    /// Pop the entries a reduction of `count` children consumes.
    ///
    /// Uncounted entries on top of the stack are not part of the reduced node;
    /// they are returned separately and must be pushed back with
    /// [`Self::restore`] once the new node is on the stack. Returns `None` if the
    /// stack holds fewer than `count` counted entries.
    pub fn pop_for_reduce(&mut self, count: usize) -> Option<(Vec<GreenNode>, Vec<GreenNode>)> {
        let mut trailing = Vec::new();
        while self.entries.len() > 1 && !self.top().is_counted() {
            trailing.extend(self.pop_node());
        }
        trailing.reverse();

        let mut children = Vec::new();
        let mut remaining = count;
        while remaining > 0 {
            if self.entries.len() <= 1 {
                return None;
            }
            let counted = self.top().is_counted();
            children.extend(self.pop_node());
            if counted {
                remaining -= 1;
            }
        }
        children.reverse();
        Some((children, trailing))
    }

    /// Re-push entries set aside by [`Self::pop_for_reduce`].
    pub fn restore(&mut self, trailing: Vec<GreenNode>) {
        for node in trailing {
            self.push_uncounted(node);
        }
    }

    /// Pop `count` counted entries and everything above them, for error
    /// recovery. Returns the popped nodes in source order.
    pub fn pop_counted(&mut self, count: usize) -> Vec<GreenNode> {
        let mut popped = Vec::new();
        let mut remaining = count;
        while remaining > 0 && self.entries.len() > 1 {
            let counted = self.top().is_counted();
            popped.extend(self.pop_node());
            if counted {
                remaining -= 1;
            }
        }
        popped.reverse();
        popped
    }

    fn pop_node(&mut self) -> Option<GreenNode> {
        self.entries.pop().and_then(|entry| entry.node)
    }

    /// States of the bottom entry and of every counted entry, bottom first.
    /// This is the state stack an LR automaton would see.
    pub fn counted_states(&self) -> Vec<StateId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(index, entry)| *index == 0 || entry.is_counted())
            .map(|(_, entry)| entry.state)
            .collect()
    }

    /// States of every entry, used to detect branches that have converged.
    pub fn signature(&self) -> Vec<StateId> {
        self.entries.iter().map(|entry| entry.state).collect()
    }

    /// All nodes on the stack, bottom first.
    pub fn into_nodes(self) -> Vec<GreenNode> {
        self.entries.into_iter().filter_map(|entry| entry.node).collect()
    }
}
