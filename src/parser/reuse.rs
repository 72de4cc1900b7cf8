//! Walking an edited tree for reusable subtrees.
//!
//! The cursor holds the unconsumed frontier of the old tree in source order,
//! most recent candidate on top. The parser peeks at the candidate starting at
//! its current position and either consumes it whole, descends into it, or
//! lexes normally.

use crate::base::Length;
use crate::syntax::{GreenNode, NodeCache, NodeKind};

struct Candidate {
    node: GreenNode,
    start: Length,
}

impl Candidate {
    fn end(&self) -> usize {
        (self.start + self.node.length()).offset()
    }
}

pub(super) struct ReuseCursor {
    /// Pending candidates, last element first in source order.
    stack: Vec<Candidate>,
}

impl ReuseCursor {
    pub fn new(root: &GreenNode) -> Self {
        Self { stack: vec![Candidate { node: root.clone(), start: Length::ZERO }] }
    }

    /// The candidate that starts exactly at `position`, if any.
    ///
    /// Candidates ending at or before `position` are dropped and candidates
    /// straddling it are split into their children.
    pub fn peek(&mut self, position: Length, cache: &mut NodeCache) -> Option<&GreenNode> {
        let offset = position.offset();
        loop {
            let (start, end) = {
                let top = self.stack.last()?;
                (top.start.offset(), top.end())
            };
            if end <= offset {
                self.stack.pop();
            } else if start < offset {
                self.descend(cache);
            } else if start == offset {
                return self.stack.last().map(|candidate| &candidate.node);
            } else {
                return None;
            }
        }
    }

    /// Consume the current candidate.
    pub fn advance(&mut self) {
        self.stack.pop();
    }

    /// Replace the current candidate with its children. Clean nodes passed on
    /// the way down are offered to `cache`, so rebuilding them yields the old
    /// node. Returns `false` for leaves, which are simply dropped.
    pub fn descend(&mut self, cache: &mut NodeCache) -> bool {
        let Some(Candidate { node, start }) = self.stack.pop() else {
            return false;
        };
        if node.children().is_empty() {
            return false;
        }
        cache.register(&node);
        let mut offset = start;
        let mut children = Vec::with_capacity(node.children().len());
        for child in node.children() {
            children.push(Candidate { node: child.clone(), start: offset });
            offset = offset + child.length();
        }
        self.stack.extend(children.into_iter().rev());
        true
    }
}

/// Whether `node` may be pushed as-is into a new parse.
pub(super) fn is_reusable(node: &GreenNode) -> bool {
    matches!(node.kind(), NodeKind::Node | NodeKind::Token)
        && !node.has_changes()
        && !node.has_error()
        && !node.is_fragile()
        && !node.length().is_empty()
}
