//! Source edits and their effect on existing trees.
//!
//! [`Tree::edit`] is a pure range shift: nodes entirely before the edit keep
//! their position, nodes after it move by the length difference, and every
//! node whose bytes or scan lookahead touch the edited range is copied with
//! the [`has_changes`](super::GreenNode::has_changes) mark. Because nodes store
//! lengths rather than offsets, only the spine above the edit is copied; every
//! shifted node keeps its identity.

use std::ops::Range;

use super::node::GreenNode;
use super::tree::Tree;
use crate::base::{Length, Point, TextSize};

/// One contiguous replacement in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_position: Point,
    pub old_end_position: Point,
    pub new_end_position: Point,
}

impl Edit {
    /// Describe replacing `range` of `old_source` with `text`.
    ///
    /// A range reaching past the end of `old_source` is clamped to it, and a
    /// reversed range is read as an insertion at its end.
    pub fn replace(old_source: &[u8], range: Range<usize>, text: &[u8]) -> Self {
        let old_end_byte = range.end.min(old_source.len());
        let start_byte = range.start.min(old_end_byte);
        let start = Length::of(&old_source[..start_byte]);
        let old_end = Length::of(&old_source[..old_end_byte]);
        let new_end = start + Length::of(text);
        Self {
            start_byte,
            old_end_byte,
            new_end_byte: new_end.offset(),
            start_position: start.extent,
            old_end_position: old_end.extent,
            new_end_position: new_end.extent,
        }
    }

    /// Apply the edit to a source buffer. Offsets past the end of
    /// `old_source` are clamped like in [`Edit::replace`].
    pub fn apply(&self, old_source: &[u8], text: &[u8]) -> Vec<u8> {
        let old_end = self.old_end_byte.min(old_source.len());
        let start = self.start_byte.min(old_end);
        let mut source = Vec::with_capacity(old_source.len() + text.len());
        source.extend_from_slice(&old_source[..start]);
        source.extend_from_slice(text);
        source.extend_from_slice(&old_source[old_end..]);
        source
    }

    /// An empty insertion: changes no byte.
    pub fn is_noop(&self) -> bool {
        self.start_byte == self.old_end_byte && self.old_end_byte == self.new_end_byte
    }

    fn start(&self) -> Length {
        Length::new(TextSize::new(self.start_byte as u32), self.start_position)
    }

    fn old_end(&self) -> Length {
        Length::new(TextSize::new(self.old_end_byte as u32), self.old_end_position)
    }

    fn new_end(&self) -> Length {
        Length::new(TextSize::new(self.new_end_byte as u32), self.new_end_position)
    }

    /// Where a node boundary at `position` ends up after the edit.
    ///
    /// Boundaries before the edit stay; boundaries inside the replaced range
    /// collapse onto its new end; boundaries after it shift. A boundary exactly
    /// at the start of an insertion moves with the text after it, except at
    /// offset 0.
    fn map(&self, position: Length) -> Length {
        let offset = position.offset();
        let stays = offset < self.start_byte
            || (offset == self.start_byte && (self.start_byte < self.old_end_byte || offset == 0));
        if stays {
            position
        } else if offset < self.old_end_byte {
            self.new_end()
        } else {
            self.new_end() + (position - self.old_end())
        }
    }

    /// Whether a node spanning `[start, end)` that looked `lookahead` bytes past
    /// its end can be influenced by this edit.
    fn touches(&self, start: usize, end: usize, lookahead: u32) -> bool {
        let reach = end + (lookahead as usize).max(1);
        let begins_before = start < self.old_end_byte || (self.start_byte == 0 && start == 0);
        begins_before && self.start_byte < reach
    }
}

impl Tree {
    /// Shift this tree's ranges for `edit` without reparsing.
    ///
    /// Apply edits in order, each expressed in the coordinates produced by the
    /// previous one; the result composes like a single combined edit.
    pub fn edit(&self, edit: &Edit) -> Tree {
        if edit.is_noop() {
            return self.clone();
        }
        let root = edit_node(self.root(), edit);
        tracing::trace!(
            start = edit.start_byte,
            old_end = edit.old_end_byte,
            new_end = edit.new_end_byte,
            "edited tree"
        );
        Tree::new(root, self.table_arc().clone())
    }
}

/// A touched inner node whose children are being edited.
struct Frame<'a> {
    node: &'a GreenNode,
    /// Start of the next child to visit.
    offset: Length,
    /// Length of the node after the edit.
    length: Length,
    children: Vec<GreenNode>,
}

/// Rebuild the spine of `root` above the edit, bottom-up with an explicit stack.
fn edit_node(root: &GreenNode, edit: &Edit) -> GreenNode {
    let mut stack = Vec::new();
    let mut finished = shift(root, Length::ZERO, edit, &mut stack);
    loop {
        let Some(frame) = stack.last_mut() else {
            return finished.unwrap_or_else(|| root.clone());
        };
        if let Some(node) = finished.take() {
            frame.children.push(node);
        }
        let parent = frame.node;
        if let Some(child) = parent.children().get(frame.children.len()) {
            let start = frame.offset;
            frame.offset = start + child.length();
            finished = shift(child, start, edit, &mut stack);
        } else if let Some(frame) = stack.pop() {
            finished = Some(frame.node.edited(frame.length, Some(frame.children)));
        }
    }
}

/// Edit a node starting at `start`. Untouched nodes and leaves are finished
/// at once; touched inner nodes are pushed for their children to be visited.
fn shift<'a>(node: &'a GreenNode, start: Length, edit: &Edit, stack: &mut Vec<Frame<'a>>) -> Option<GreenNode> {
    let end = start + node.length();
    if !edit.touches(start.offset(), end.offset(), node.lookahead()) {
        return Some(node.clone());
    }
    let length = edit.map(end) - edit.map(start);
    if node.children().is_empty() {
        return Some(node.edited(length, None));
    }
    stack.push(Frame { node, offset: start, length, children: Vec::with_capacity(node.children().len()) });
    None
}
