//! Full parses of well-formed input

use cairo_syntax::{NodeKind, Parser, Point, TextRange, TextSize, parse};

use crate::helpers::grammars::let_language;
use crate::helpers::tree_assertions::{assert_covers, leaf_texts};

#[test]
fn test_single_statement_shape() {
    let source = b"let x = 1;";
    let tree = parse(&let_language(), source, None).unwrap();

    assert_eq!(tree.to_sexp(), "(Program (Statement (Let) (Ident) (Eq) (Number) (Semi)))");
    assert!(!tree.root_node().has_error());
    assert!(tree.diagnostics().is_empty());
    assert_covers(&tree, source);
    assert_eq!(leaf_texts(&tree, source), vec!["let", " ", "x", " ", "=", " ", "1", ";"]);
}

#[test]
fn test_node_positions() {
    let source = b"let x = 1;\nlet yy = 22;";
    let tree = parse(&let_language(), source, None).unwrap();
    let root = tree.root_node();
    let statements = root.named_children();
    assert_eq!(statements.len(), 2);

    let second = statements[1];
    assert_eq!(second.kind(), "Statement");
    assert_eq!(second.start_byte(), 11);
    assert_eq!(second.end_byte(), source.len());
    assert_eq!(second.start_position(), Point::new(1, 0));
    assert_eq!(second.utf8_text(source), Some("let yy = 22;"));

    let number = second.named_children()[3];
    assert_eq!(number.kind(), "Number");
    assert_eq!(number.byte_range(), TextRange::new(TextSize::new(20), TextSize::new(22)));
    assert_eq!(number.green().kind(), NodeKind::Token);
}

#[test]
fn test_empty_source() {
    let tree = parse(&let_language(), b"", None).unwrap();
    assert_eq!(tree.to_sexp(), "(Program)");
    assert!(tree.is_empty());
}

#[test]
fn test_descendant_for_byte_finds_leaf() {
    let source = b"let abc = 1;";
    let tree = parse(&let_language(), source, None).unwrap();
    let node = tree.root_node().descendant_for_byte(TextSize::new(5));
    assert_eq!(node.kind(), "Ident");
    assert_eq!(node.utf8_text(source), Some("abc"));
}

#[test]
fn test_cursor_walks_visible_nodes() {
    let tree = parse(&let_language(), b"let x = 1;", None).unwrap();
    let mut cursor = tree.walk();
    assert_eq!(cursor.node().kind(), "Program");
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "Statement");
    assert!(cursor.goto_first_child());

    let mut kinds = vec![cursor.node().kind()];
    while cursor.goto_next_sibling() {
        kinds.push(cursor.node().kind());
    }
    assert_eq!(kinds, vec!["Let", "Ident", "Eq", "Number", "Semi"]);
    assert!(cursor.goto_parent());
    assert_eq!(cursor.depth(), 1);
}

#[test]
fn test_parser_is_reusable_across_documents() {
    let mut parser = Parser::new(let_language());
    let first = parser.parse(b"let a = 1;").unwrap();
    let second = parser.parse(b"let a = 1;").unwrap();
    assert_eq!(first, second);
    assert_eq!(parser.language().name(), "let");
}

#[test]
fn test_long_statement_list_walks_without_recursion() {
    let source = "let x = 1;\n".repeat(20_000);
    let tree = parse(&let_language(), source.as_bytes(), None).unwrap();

    assert_eq!(tree.root_node().child_count(), 20_000);
    assert_eq!(tree.leaves().len(), 20_000 * 6);
    assert!(tree.to_sexp().ends_with("(Semi)))"));
    assert!(tree.diagnostics().is_empty());

    let edit = cairo_syntax::Edit::replace(source.as_bytes(), 8..9, b"2");
    let edited = tree.edit(&edit);
    assert!(edited.root_node().has_changes());
    // Same shape and lengths, different nodes along the edited spine.
    assert_eq!(edited, tree);
    assert!(!edited.root().ptr_eq(tree.root()));
}
