//! Diagnostics derived from error and missing nodes.

use super::codes::ErrorCode;
use super::error::SyntaxError;
use crate::base::{Length, SymbolId, TextRange};
use crate::syntax::{GreenNode, NodeKind, Tree};
use crate::table::{ERROR, ParseTable};

impl Tree {
    /// Every syntax problem recorded in the tree, in source order.
    ///
    /// Unrecognized input yields `E0101`, missing nodes `E02xx`, error nodes
    /// `E03xx` and a tree whose root is an error node `E0901`.
    pub fn diagnostics(&self) -> Vec<SyntaxError> {
        let mut out = Vec::new();
        if self.root().has_error() {
            collect(self.table(), self.root(), &mut out);
        }
        out.sort_by_key(|error| (error.range.start(), error.range.end()));
        out
    }
}

enum Pending<'a> {
    Visit { node: &'a GreenNode, start: Length, is_root: bool },
    Missing { parent: &'a GreenNode, index: usize, parent_start: Length, at: Length },
}

/// Walk the erroneous part of the tree in source order.
fn collect(table: &ParseTable, root: &GreenNode, out: &mut Vec<SyntaxError>) {
    let mut stack = vec![Pending::Visit { node: root, start: Length::ZERO, is_root: true }];
    while let Some(pending) = stack.pop() {
        let (node, start, is_root) = match pending {
            Pending::Visit { node, start, is_root } => (node, start, is_root),
            Pending::Missing { parent, index, parent_start, at } => {
                out.push(missing(table, parent, index, parent_start, at));
                continue;
            }
        };
        match node.kind() {
            NodeKind::Missing => continue,
            NodeKind::Token => {
                if node.symbol() == ERROR {
                    out.push(
                        SyntaxError::builder(ErrorCode::E0101)
                            .message("unrecognized input")
                            .range(range_of(node, start))
                            .start(start.extent)
                            .build(),
                    );
                }
                continue;
            }
            NodeKind::Error => out.extend(unexpected(table, node, start, is_root)),
            NodeKind::Node => {}
        }

        let first = stack.len();
        let mut offset = start;
        for (index, child) in node.children().iter().enumerate() {
            if child.is_missing() {
                stack.push(Pending::Missing { parent: node, index, parent_start: start, at: offset });
            } else if child.has_error() {
                stack.push(Pending::Visit { node: child, start: offset, is_root: false });
            }
            offset = offset + child.length();
        }
        stack[first..].reverse();
    }
}

fn unexpected(table: &ParseTable, node: &GreenNode, start: Length, is_root: bool) -> Option<SyntaxError> {
    let range = range_of(node, start);
    if is_root {
        return Some(SyntaxError::builder(ErrorCode::E0901).range(range).start(start.extent).build());
    }

    let skipped = node
        .children()
        .iter()
        .find(|child| child.kind() == NodeKind::Token && !child.is_extra() && child.symbol() != ERROR);
    if let Some(token) = skipped {
        let name = table.symbol_name(token.symbol());
        return Some(
            SyntaxError::builder(ErrorCode::E0301)
                .message(format!("unexpected {}", display(table, token.symbol())))
                .range(range)
                .start(start.extent)
                .symbol(name)
                .build(),
        );
    }

    // Runs of unrecognized bytes are reported by their own E0101.
    let mut structure = node.children().iter().filter(|child| !child.is_extra() && child.kind() != NodeKind::Token);
    let first = structure.next()?;
    Some(
        SyntaxError::builder(ErrorCode::E0302)
            .message(format!("unexpected {}", display(table, first.symbol())))
            .range(range)
            .start(start.extent)
            .symbol(table.symbol_name(first.symbol()))
            .hint("the surrounding construct was abandoned to continue parsing")
            .build(),
    )
}

fn missing(table: &ParseTable, parent: &GreenNode, index: usize, parent_start: Length, at: Length) -> SyntaxError {
    let symbol = parent.children()[index].symbol();
    let name = table.symbol_name(symbol);
    let shown = display(table, symbol);
    let mut builder = SyntaxError::builder(ErrorCode::for_missing(name))
        .message(format!("missing {shown}"))
        .at_offset(at.bytes)
        .start(at.extent)
        .symbol(name)
        .hint(format!("insert {shown}"));
    if let Some(opener) = opener_for(name) {
        if let Some(range) = preceding_sibling(table, parent, index, parent_start, opener) {
            builder = builder.related(format!("to match this '{opener}'"), range);
        }
    }
    builder.build()
}

/// Range of the nearest sibling before `index` named `name`.
fn preceding_sibling(
    table: &ParseTable,
    parent: &GreenNode,
    index: usize,
    parent_start: Length,
    name: &str,
) -> Option<TextRange> {
    let mut offset = parent_start;
    let mut found = None;
    for child in &parent.children()[..index] {
        if child.is_leaf() && table.symbol_name(child.symbol()) == name {
            found = Some(range_of(child, offset));
        }
        offset = offset + child.length();
    }
    found
}

fn opener_for(closer: &str) -> Option<&'static str> {
    match closer {
        "}" => Some("{"),
        ")" => Some("("),
        "]" => Some("["),
        _ => None,
    }
}

fn display(table: &ParseTable, symbol: SymbolId) -> String {
    let name = table.symbol_name(symbol);
    if table.is_named(symbol) { name.to_string() } else { format!("'{name}'") }
}

fn range_of(node: &GreenNode, start: Length) -> TextRange {
    TextRange::at(start.bytes, node.length().bytes)
}
