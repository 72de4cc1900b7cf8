//! Finished trees and positioned node views.

use std::fmt;
use std::sync::Arc;

use super::cursor::TreeCursor;
use super::node::{GreenNode, NodeKind};
use crate::base::{Length, Point, PointRange, SymbolId, TextRange, TextSize};
use crate::table::ParseTable;

/// The result of one parse: a root node covering the whole source.
///
/// Trees are immutable. Editing produces a new tree that shares every
/// untouched node with this one.
#[derive(Clone)]
pub struct Tree {
    root: GreenNode,
    table: Arc<ParseTable>,
}

impl Tree {
    pub(crate) fn new(root: GreenNode, table: Arc<ParseTable>) -> Self {
        Self { root, table }
    }

    pub fn root_node(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, green: &self.root, start: Length::ZERO }
    }

    /// The root green node.
    pub fn root(&self) -> &GreenNode {
        &self.root
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root_node())
    }

    /// Source length covered by the tree.
    pub fn length(&self) -> Length {
        self.root.length()
    }

    pub fn len(&self) -> usize {
        self.root.length().offset()
    }

    pub fn is_empty(&self) -> bool {
        self.root.length().is_empty()
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub(crate) fn table_arc(&self) -> &Arc<ParseTable> {
        &self.table
    }

    /// Every leaf in source order, hidden ones included. The leaves of a tree
    /// tile its range with no gaps or overlaps.
    pub fn leaves(&self) -> Vec<SyntaxNode<'_>> {
        let mut leaves = Vec::new();
        collect_leaves(self, &self.root, &mut leaves);
        leaves
    }

    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }
}

/// Structural equality of the two roots.
impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree").field("language", &self.table.name()).field("sexp", &self.to_sexp()).finish()
    }
}

fn collect_leaves<'t>(tree: &'t Tree, root: &'t GreenNode, out: &mut Vec<SyntaxNode<'t>>) {
    let mut stack = vec![(root, Length::ZERO)];
    while let Some((node, start)) = stack.pop() {
        if node.is_leaf() {
            out.push(SyntaxNode { tree, green: node, start });
            continue;
        }
        push_children(&mut stack, node, start);
    }
}

/// Push the children of `node` so that the first child is popped first.
fn push_children<'t>(stack: &mut Vec<(&'t GreenNode, Length)>, node: &'t GreenNode, start: Length) {
    let first = stack.len();
    let mut offset = start;
    for child in node.children() {
        stack.push((child, offset));
        offset = offset + child.length();
    }
    stack[first..].reverse();
}

/// A node together with its absolute position in one tree.
///
/// Hidden nodes (rules starting with `_`, repetition helpers, hidden tokens)
/// never appear as a `SyntaxNode`; their children are spliced into the parent.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t Tree,
    green: &'t GreenNode,
    start: Length,
}

impl<'t> SyntaxNode<'t> {
    pub(crate) fn new(tree: &'t Tree, green: &'t GreenNode, start: Length) -> Self {
        Self { tree, green, start }
    }

    pub fn green(&self) -> &'t GreenNode {
        self.green
    }

    /// Identity of the underlying shared node.
    pub fn id(&self) -> usize {
        self.green.id()
    }

    pub fn symbol(&self) -> SymbolId {
        self.green.symbol()
    }

    /// Grammar name of the node, `"ERROR"` for error nodes.
    pub fn kind(&self) -> &'t str {
        self.tree.table.symbol_name(self.green.symbol())
    }

    pub fn is_named(&self) -> bool {
        self.green.kind() == NodeKind::Error || self.tree.table.is_named(self.green.symbol())
    }

    pub fn is_error(&self) -> bool {
        self.green.is_error()
    }

    pub fn is_missing(&self) -> bool {
        self.green.is_missing()
    }

    pub fn is_extra(&self) -> bool {
        self.green.is_extra()
    }

    pub fn has_error(&self) -> bool {
        self.green.has_error()
    }

    pub fn has_changes(&self) -> bool {
        self.green.has_changes()
    }

    pub fn start_byte(&self) -> usize {
        self.start.offset()
    }

    pub fn end_byte(&self) -> usize {
        self.end().offset()
    }

    pub fn start_position(&self) -> Point {
        self.start.extent
    }

    pub fn end_position(&self) -> Point {
        self.end().extent
    }

    pub fn byte_range(&self) -> TextRange {
        TextRange::new(self.start.bytes, self.end().bytes)
    }

    pub fn point_range(&self) -> PointRange {
        PointRange::new(self.start_position(), self.end_position())
    }

    pub fn range(&self) -> (TextRange, PointRange) {
        (self.byte_range(), self.point_range())
    }

    fn end(&self) -> Length {
        self.start + self.green.length()
    }

    /// Visible children in source order.
    pub fn children(&self) -> Vec<SyntaxNode<'t>> {
        let mut children = Vec::new();
        collect_visible(self.tree, self.green, self.start, &mut children);
        children
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode<'t>> {
        self.children().into_iter().nth(index)
    }

    pub fn named_children(&self) -> Vec<SyntaxNode<'t>> {
        self.children().into_iter().filter(SyntaxNode::shows_in_sexp).collect()
    }

    /// The smallest visible node containing `offset`.
    pub fn descendant_for_byte(&self, offset: TextSize) -> SyntaxNode<'t> {
        let mut node = *self;
        'descend: loop {
            for child in node.children() {
                let range = child.byte_range();
                if range.contains(offset) || (range.is_empty() && range.start() == offset) {
                    node = child;
                    continue 'descend;
                }
            }
            return node;
        }
    }

    /// Text of the node in `source`, the buffer the tree was parsed from.
    pub fn utf8_text<'s>(&self, source: &'s [u8]) -> Option<&'s str> {
        let bytes = source.get(self.start_byte()..self.end_byte())?;
        std::str::from_utf8(bytes).ok()
    }

    /// S-expression of named nodes, e.g. `(Program (Statement (Let) (MISSING Number)))`.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn shows_in_sexp(&self) -> bool {
        self.is_named() || self.is_missing()
    }

    fn write_sexp(&self, out: &mut String) {
        // `None` closes the innermost open node.
        let mut pending = vec![Some(*self)];
        while let Some(item) = pending.pop() {
            match item {
                None => out.push(')'),
                Some(node) => node.open_sexp(out, &mut pending),
            }
            if matches!(pending.last(), Some(Some(_))) {
                out.push(' ');
            }
        }
    }

    /// Write the head of this node and queue its children and closing paren.
    fn open_sexp(self, out: &mut String, pending: &mut Vec<Option<SyntaxNode<'t>>>) {
        if self.is_missing() {
            out.push_str("(MISSING ");
            if self.is_named() {
                out.push_str(self.kind());
            } else {
                out.push_str(&format!("{:?}", self.kind()));
            }
            out.push(')');
        } else {
            out.push('(');
            out.push_str(self.kind());
            pending.push(None);
            pending.extend(self.named_children().into_iter().rev().map(Some));
        }
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.green.ptr_eq(other.green) && self.start == other.start
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.byte_range())
    }
}

fn is_visible(table: &ParseTable, node: &GreenNode) -> bool {
    matches!(node.kind(), NodeKind::Error | NodeKind::Missing) || table.is_visible(node.symbol())
}

fn collect_visible<'t>(tree: &'t Tree, node: &'t GreenNode, start: Length, out: &mut Vec<SyntaxNode<'t>>) {
    let mut stack = Vec::new();
    push_children(&mut stack, node, start);
    while let Some((child, offset)) = stack.pop() {
        if is_visible(&tree.table, child) {
            out.push(SyntaxNode { tree, green: child, start: offset });
        } else if !child.is_leaf() {
            push_children(&mut stack, child, offset);
        }
    }
}
