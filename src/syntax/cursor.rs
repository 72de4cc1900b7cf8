//! Stateful walking over visible nodes.

use super::tree::SyntaxNode;

struct Frame<'t> {
    siblings: Vec<SyntaxNode<'t>>,
    index: usize,
}

/// A cursor that moves between parents, children and siblings.
///
/// ```text
/// let mut cursor = tree.walk();
/// if cursor.goto_first_child() {
///     while cursor.goto_next_sibling() {}
/// }
/// ```
pub struct TreeCursor<'t> {
    frames: Vec<Frame<'t>>,
}

impl<'t> TreeCursor<'t> {
    pub(crate) fn new(root: SyntaxNode<'t>) -> Self {
        Self { frames: vec![Frame { siblings: vec![root], index: 0 }] }
    }

    pub fn node(&self) -> SyntaxNode<'t> {
        // The root frame is never popped, so there is always a current node.
        let frame = &self.frames[self.frames.len() - 1];
        frame.siblings[frame.index]
    }

    /// Depth of the current node; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn goto_first_child(&mut self) -> bool {
        let children = self.node().children();
        if children.is_empty() {
            return false;
        }
        self.frames.push(Frame { siblings: children, index: 0 });
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        if self.frames.len() == 1 {
            return false;
        }
        let last = self.frames.len() - 1;
        let frame = &mut self.frames[last];
        if frame.index + 1 < frame.siblings.len() {
            frame.index += 1;
            true
        } else {
            false
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.frames.len() == 1 {
            return false;
        }
        self.frames.pop();
        true
    }

    /// Move to the first child that contains or starts after `offset`.
    pub fn goto_first_child_for_byte(&mut self, offset: usize) -> Option<usize> {
        let children = self.node().children();
        let index = children.iter().position(|child| child.end_byte() > offset)?;
        self.frames.push(Frame { siblings: children, index });
        Some(index)
    }

    /// Return to the root.
    pub fn reset(&mut self) {
        self.frames.truncate(1);
    }
}
