//! Edits and incremental reparsing

use cairo_syntax::{Edit, Parser, ParserConfig, SyntaxNode, Tree, parse};
use rstest::rstest;

use crate::helpers::grammars::let_language;
use crate::helpers::tree_assertions::assert_covers;

fn leaf<'t>(tree: &'t Tree, kind: &str, nth: usize) -> SyntaxNode<'t> {
    tree.leaves().into_iter().filter(|leaf| leaf.kind() == kind).nth(nth).unwrap()
}

#[test]
fn test_replacing_number_reuses_untouched_leaves() {
    let language = let_language();
    let mut parser = Parser::new(language.clone());
    let old_source = b"let x = 1;";
    let old = parser.parse(old_source).unwrap();

    let edit = Edit::replace(old_source, 8..9, b"42");
    let new_source = edit.apply(old_source, b"42");
    assert_eq!(new_source, b"let x = 42;");
    let new = parser.reparse(&old.edit(&edit), &new_source).unwrap();

    assert_eq!(new, parse(&language, &new_source, None).unwrap());
    assert_covers(&new, &new_source);
    for kind in ["Let", "Ident", "Eq", "Semi"] {
        assert!(leaf(&new, kind, 0).green().ptr_eq(leaf(&old, kind, 0).green()), "{kind} was not reused");
    }
    let number = leaf(&new, "Number", 0);
    assert!(!number.green().ptr_eq(leaf(&old, "Number", 0).green()));
    assert_eq!(number.utf8_text(&new_source), Some("42"));
}

#[test]
fn test_edit_marks_only_touched_nodes() {
    let source = b"let x = 1;\nlet y = 2;";
    let tree = parse(&let_language(), source, None).unwrap();
    let edited = tree.edit(&Edit::replace(source, 19..20, b"3"));

    let statements = edited.root_node().named_children();
    assert!(!statements[0].has_changes());
    assert!(statements[1].has_changes());
    assert!(edited.root_node().has_changes());
    assert!(statements[0].green().ptr_eq(tree.root_node().named_children()[0].green()));
}

#[test]
fn test_sequential_edits_match_combined_edit() {
    let language = let_language();
    let mut parser = Parser::new(language.clone());
    let initial = b"let x = 1;\nlet y = 2;";
    let tree = parser.parse(initial).unwrap();

    let first = Edit::replace(initial, 8..9, b"42");
    let after_first = first.apply(initial, b"42");
    let second = Edit::replace(&after_first, 20..21, b"7");
    let after_second = second.apply(&after_first, b"7");
    assert_eq!(after_second, b"let x = 42;\nlet y = 7;");

    let combined = Edit::replace(initial, 8..20, &after_second[8..21]);
    assert_eq!(combined.apply(initial, &after_second[8..21]), after_second);

    let sequential = parser.reparse(&tree.edit(&first).edit(&second), &after_second).unwrap();
    let single = parser.reparse(&tree.edit(&combined), &after_second).unwrap();
    assert_eq!(sequential, single);
    assert_eq!(sequential, parse(&language, &after_second, None).unwrap());
}

#[test]
fn test_reparse_without_changes_is_identity() {
    let mut parser = Parser::new(let_language());
    let source = b"let x = 1;\nlet y = 2;";
    let tree = parser.parse(source).unwrap();
    let again = parser.reparse(&tree, source).unwrap();

    assert_eq!(again, tree);
    for (new, old) in again.leaves().iter().zip(tree.leaves()) {
        assert!(new.green().ptr_eq(old.green()));
    }
}

#[rstest]
#[case(b"let x = 1;".as_slice(), 0..0, b"let y = 0;".as_slice())]
#[case(b"let x = 1;".as_slice(), 10..10, b" let y = 2;".as_slice())]
#[case(b"let x = 1; let y = 2;".as_slice(), 4..5, b"abc".as_slice())]
#[case(b"let x = 1; let y = 2;".as_slice(), 9..11, b"".as_slice())]
#[case(b"let x = 1; let y = 2;".as_slice(), 3..3, b"x".as_slice())]
#[case(b"let x = 1;".as_slice(), 0..10, b"".as_slice())]
#[case(b"let x = 1;".as_slice(), 6..7, b"@".as_slice())]
fn test_reparse_equals_fresh_parse(#[case] old_source: &[u8], #[case] range: std::ops::Range<usize>, #[case] text: &[u8]) {
    let language = let_language();
    let mut parser = Parser::new(language.clone());
    let old = parser.parse(old_source).unwrap();

    let edit = Edit::replace(old_source, range, text);
    let new_source = edit.apply(old_source, text);
    let new = parser.reparse(&old.edit(&edit), &new_source).unwrap();

    assert_eq!(new, parse(&language, &new_source, None).unwrap());
    assert_covers(&new, &new_source);
}

#[test]
fn test_unedited_tree_is_not_reused_for_changed_source() {
    let language = let_language();
    let mut parser = Parser::new(language.clone());
    let tree = parser.parse(b"let x = 1;").unwrap();

    // The caller forgot to apply the edit; the old tree has the wrong length.
    let source = b"let x = 12;";
    let reparsed = parser.reparse(&tree, source).unwrap();
    assert_eq!(reparsed, parse(&language, source, None).unwrap());
}

#[test]
fn test_incremental_can_be_disabled() {
    let language = let_language();
    let mut parser = Parser::with_config(language, ParserConfig::default().with_incremental(false));
    let source = b"let x = 1;";
    let tree = parser.parse(source).unwrap();
    let again = parser.reparse(&tree, source).unwrap();

    assert_eq!(again, tree);
    assert!(!leaf(&again, "Let", 0).green().ptr_eq(leaf(&tree, "Let", 0).green()));
}

#[rstest]
#[case::extra_number("let x = 1 2;\nlet y = 3;\nlet z = 4;", "4", "42")]
#[case::missing_number("let x = ;\nlet y = 3;", "3", "5")]
#[case::missing_name("let x = 1;\nlet = 2;\nlet y = 3;", "y", "abc")]
#[case::garbage_before_edit("let x = 1; @ let y = 2;", "2", "7")]
#[case::edit_before_error("let x = 1;\nlet y = 2;\nlet z = 3 3;", "x", "w")]
#[case::fix_the_error("let x = 1;\nlet y = ;\nlet z = 3;", "= ;", "= 2;")]
fn test_reparse_of_tree_with_errors_equals_fresh_parse(#[case] source: &str, #[case] find: &str, #[case] replace: &str) {
    let language = let_language();
    let mut parser = Parser::new(language.clone());
    let old_source = source.as_bytes();
    let old = parser.parse(old_source).unwrap();
    assert!(old.root_node().has_error());

    let start = source.rfind(find).unwrap();
    let edit = Edit::replace(old_source, start..start + find.len(), replace.as_bytes());
    let new_source = edit.apply(old_source, replace.as_bytes());
    let new = parser.reparse(&old.edit(&edit), &new_source).unwrap();

    assert_eq!(new, parse(&language, &new_source, None).unwrap());
    assert_eq!(new.to_sexp(), parse(&language, &new_source, None).unwrap().to_sexp());
    assert_covers(&new, &new_source);
}
