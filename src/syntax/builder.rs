//! Node construction with subtree deduplication.
//!
//! Every reduction goes through a [`NodeCache`]. Two reductions with the same
//! symbol, production, parse state, lookahead and child identities yield the
//! same `Arc`, and nodes offered from a previous tree take part as well, so an
//! incremental parse that rebuilds an unchanged node gets the old node back.

use rustc_hash::FxHashMap;

use super::node::{GreenNode, NodeFlags, NodeKind};
use crate::base::{ProductionId, StateId, SymbolId};

#[derive(Debug, PartialEq, Eq, Hash)]
struct NodeKey {
    symbol: SymbolId,
    production: ProductionId,
    state: StateId,
    lookahead: u32,
    flags: u8,
    children: Box<[usize]>,
}

impl NodeKey {
    fn new(
        symbol: SymbolId,
        production: ProductionId,
        state: StateId,
        lookahead: u32,
        flags: NodeFlags,
        children: &[GreenNode],
    ) -> Self {
        Self {
            symbol,
            production,
            state,
            lookahead,
            flags: flags.without(NodeFlags::HAS_ERROR).bits(),
            children: children.iter().map(GreenNode::id).collect(),
        }
    }
}

/// Per-parse table of built nodes.
#[derive(Debug, Default)]
pub(crate) struct NodeCache {
    nodes: FxHashMap<NodeKey, GreenNode>,
    hits: usize,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an internal node, or return an identical one built earlier.
    pub fn node(
        &mut self,
        symbol: SymbolId,
        production: ProductionId,
        state: StateId,
        children: Vec<GreenNode>,
        lookahead: u32,
        flags: NodeFlags,
    ) -> GreenNode {
        if flags.contains(NodeFlags::FRAGILE) {
            return GreenNode::branch(symbol, production, state, children, lookahead, flags);
        }
        let key = NodeKey::new(symbol, production, state, lookahead, flags, &children);
        if let Some(existing) = self.nodes.get(&key) {
            self.hits += 1;
            return existing.clone();
        }
        let node = GreenNode::branch(symbol, production, state, children, lookahead, flags);
        self.nodes.insert(key, node.clone());
        node
    }

    /// Offer a node of a previous tree for deduplication.
    ///
    /// Only clean nodes qualify: changed, fragile and error-carrying nodes must
    /// never come back into a new tree.
    pub fn register(&mut self, node: &GreenNode) {
        let clean = node.kind() == NodeKind::Node && !node.has_changes() && !node.is_fragile() && !node.has_error();
        if !clean {
            return;
        }
        let key = NodeKey::new(
            node.symbol(),
            node.production(),
            node.state(),
            node.lookahead(),
            node.flags(),
            node.children(),
        );
        self.nodes.entry(key).or_insert_with(|| node.clone());
    }

    /// Number of reductions answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// Splice the extras and error nodes surrounding the accepted node into it, so
/// the root spans the whole input.
pub(crate) fn finish_root(root: GreenNode, before: Vec<GreenNode>, after: Vec<GreenNode>) -> GreenNode {
    if before.is_empty() && after.is_empty() {
        return root;
    }
    let mut children = before;
    children.extend(root.children().iter().cloned());
    children.extend(after);
    let flags = root.flags().without(NodeFlags::HAS_ERROR).without(NodeFlags::CHANGED);
    GreenNode::branch(root.symbol(), root.production(), root.state(), children, root.lookahead(), flags)
}
