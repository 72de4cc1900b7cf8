//! Immutable, reference-counted tree nodes.
//!
//! A [`GreenNode`] knows its symbol, its [`Length`] and its children, but not
//! where it sits in the source. Trees share green nodes freely: an incremental
//! reparse returns a tree whose untouched subtrees are the very same `Arc`s as
//! in the previous tree. Trees are DAGs of parent-to-child edges only.

use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use crate::base::{Length, ProductionId, StateId, SymbolId};
use crate::table::ERROR;

/// Marker for nodes that were not produced by a reduction.
pub(crate) const NO_PRODUCTION: ProductionId = ProductionId::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A lexed token.
    Token,
    /// A reduced production.
    Node,
    /// Input the grammar could not derive, with whatever was built inside it.
    Error,
    /// A zero-width token inferred by error recovery.
    Missing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct NodeFlags(u8);

impl NodeFlags {
    pub const NONE: Self = Self(0);
    /// Whitespace, comments and other tokens allowed anywhere.
    pub const EXTRA: Self = Self(1);
    /// Built while several parse branches were alive or during recovery.
    pub const FRAGILE: Self = Self(1 << 1);
    /// Touched by an edit since it was built.
    pub const CHANGED: Self = Self(1 << 2);
    /// Contains an error or missing node.
    pub const HAS_ERROR: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for NodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

pub(crate) struct NodeData {
    symbol: SymbolId,
    kind: NodeKind,
    production: ProductionId,
    /// Parse state on top of the stack when this node was pushed.
    state: StateId,
    length: Length,
    /// Bytes past the end of the node that influenced how it was built.
    lookahead: u32,
    flags: NodeFlags,
    error_cost: u32,
    children: Box<[GreenNode]>,
}

/// Children are released with an explicit work list so that dropping a deep
/// tree does not recurse once per level.
impl Drop for NodeData {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let mut orphans = std::mem::take(&mut self.children).into_vec();
        while let Some(node) = orphans.pop() {
            if let Some(mut data) = Arc::into_inner(node.0) {
                orphans.extend(std::mem::take(&mut data.children).into_vec());
            }
        }
    }
}

/// A shared immutable node.
#[derive(Clone)]
pub struct GreenNode(Arc<NodeData>);

impl GreenNode {
    pub(crate) fn token(symbol: SymbolId, length: Length, lookahead: u32, state: StateId, flags: NodeFlags) -> Self {
        let (flags, error_cost) = if symbol == ERROR { (flags | NodeFlags::HAS_ERROR, 1) } else { (flags, 0) };
        Self(Arc::new(NodeData {
            symbol,
            kind: NodeKind::Token,
            production: NO_PRODUCTION,
            state,
            length,
            lookahead,
            flags,
            error_cost,
            children: Box::new([]),
        }))
    }

    pub(crate) fn missing(symbol: SymbolId, state: StateId) -> Self {
        Self(Arc::new(NodeData {
            symbol,
            kind: NodeKind::Missing,
            production: NO_PRODUCTION,
            state,
            length: Length::ZERO,
            lookahead: 0,
            flags: NodeFlags::HAS_ERROR | NodeFlags::FRAGILE,
            error_cost: 1,
            children: Box::new([]),
        }))
    }

    pub(crate) fn branch(
        symbol: SymbolId,
        production: ProductionId,
        state: StateId,
        children: Vec<GreenNode>,
        lookahead: u32,
        flags: NodeFlags,
    ) -> Self {
        Self::assemble(symbol, NodeKind::Node, production, state, children, lookahead, flags, 0)
    }

    pub(crate) fn error(children: Vec<GreenNode>, state: StateId, skipped: u32) -> Self {
        let flags = NodeFlags::HAS_ERROR | NodeFlags::FRAGILE;
        Self::assemble(ERROR, NodeKind::Error, NO_PRODUCTION, state, children, 0, flags, 1 + skipped)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        symbol: SymbolId,
        kind: NodeKind,
        production: ProductionId,
        state: StateId,
        children: Vec<GreenNode>,
        lookahead: u32,
        mut flags: NodeFlags,
        own_cost: u32,
    ) -> Self {
        let mut length = Length::ZERO;
        let mut error_cost = own_cost;
        for child in &children {
            length = length + child.length();
            error_cost += child.error_cost();
            if child.has_error() {
                flags = flags | NodeFlags::HAS_ERROR;
            }
        }
        Self(Arc::new(NodeData {
            symbol,
            kind,
            production,
            state,
            length,
            lookahead,
            flags,
            error_cost,
            children: children.into_boxed_slice(),
        }))
    }

    /// Copy of this node with a new length and children, marked as changed.
    pub(crate) fn edited(&self, length: Length, children: Option<Vec<GreenNode>>) -> Self {
        let data = &self.0;
        Self(Arc::new(NodeData {
            symbol: data.symbol,
            kind: data.kind,
            production: data.production,
            state: data.state,
            length,
            lookahead: data.lookahead,
            flags: data.flags | NodeFlags::CHANGED,
            error_cost: data.error_cost,
            children: children.map(Vec::into_boxed_slice).unwrap_or_else(|| data.children.clone()),
        }))
    }

    pub fn symbol(&self) -> SymbolId {
        self.0.symbol
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    pub(crate) fn production(&self) -> ProductionId {
        self.0.production
    }

    pub(crate) fn state(&self) -> StateId {
        self.0.state
    }

    pub fn length(&self) -> Length {
        self.0.length
    }

    pub(crate) fn lookahead(&self) -> u32 {
        self.0.lookahead
    }

    pub(crate) fn flags(&self) -> NodeFlags {
        self.0.flags
    }

    pub fn children(&self) -> &[GreenNode] {
        &self.0.children
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.0.kind, NodeKind::Token | NodeKind::Missing)
    }

    pub fn is_extra(&self) -> bool {
        self.0.flags.contains(NodeFlags::EXTRA)
    }

    pub fn is_error(&self) -> bool {
        self.0.kind == NodeKind::Error || self.0.symbol == ERROR
    }

    pub fn is_missing(&self) -> bool {
        self.0.kind == NodeKind::Missing
    }

    pub fn has_error(&self) -> bool {
        self.0.flags.contains(NodeFlags::HAS_ERROR)
    }

    pub fn has_changes(&self) -> bool {
        self.0.flags.contains(NodeFlags::CHANGED)
    }

    pub(crate) fn is_fragile(&self) -> bool {
        self.0.flags.contains(NodeFlags::FRAGILE)
    }

    /// Sum of error and missing nodes, weighted by skipped input.
    pub fn error_cost(&self) -> u32 {
        self.0.error_cost
    }

    /// Leftmost leaf, possibly `self`.
    pub(crate) fn first_leaf(&self) -> &GreenNode {
        let mut node = self;
        while let Some(first) = node.children().first() {
            node = first;
        }
        node
    }

    /// Number of leaves below this node.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                count += 1;
            } else {
                stack.extend(node.children());
            }
        }
        count
    }

    pub fn ptr_eq(&self, other: &GreenNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared node data. Equal ids mean the same node.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

/// Structural equality: same kinds, symbols, lengths and children.
///
/// Parse bookkeeping (states, lookahead, reuse flags) is ignored, so a tree
/// produced incrementally compares equal to the same tree parsed from scratch.
impl PartialEq for GreenNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.ptr_eq(b) {
                continue;
            }
            let same = a.kind() == b.kind()
                && a.symbol() == b.symbol()
                && a.length() == b.length()
                && a.is_extra() == b.is_extra()
                && a.children().len() == b.children().len();
            if !same {
                return false;
            }
            pending.extend(a.children().iter().zip(b.children()));
        }
        true
    }
}

impl Eq for GreenNode {}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("GreenNode");
        debug
            .field("symbol", &self.symbol())
            .field("kind", &self.kind())
            .field("bytes", &self.length().bytes);
        if !self.children().is_empty() {
            debug.field("children", &self.children().len());
        }
        debug.finish()
    }
}
