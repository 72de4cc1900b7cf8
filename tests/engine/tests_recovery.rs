//! Malformed input never fails a parse

use cairo_syntax::{ErrorCode, NodeKind, Parser, ParserConfig, TextSize, parse};
use rstest::rstest;

use crate::helpers::grammars::let_language;
use crate::helpers::tree_assertions::assert_covers;

#[test]
fn test_missing_number_is_inserted() {
    let source = b"let x = ;";
    let tree = parse(&let_language(), source, None).unwrap();

    assert_eq!(tree.to_sexp(), "(Program (Statement (Let) (Ident) (Eq) (MISSING Number) (Semi)))");
    let missing = tree.leaves().into_iter().find(|leaf| leaf.is_missing()).unwrap();
    assert_eq!(missing.start_byte(), 8);
    assert_eq!(missing.end_byte(), 8);
    assert_eq!(missing.green().kind(), NodeKind::Missing);
    assert!(tree.root_node().has_error());
    assert_covers(&tree, source);
}

#[test]
fn test_error_is_local_to_one_statement() {
    let source = b"let a = 1; let b = ; let c = 3;";
    let tree = parse(&let_language(), source, None).unwrap();
    let statements = tree.root_node().named_children();

    assert_eq!(statements.len(), 3);
    assert!(!statements[0].has_error());
    assert!(statements[1].has_error());
    assert!(!statements[2].has_error());
}

#[test]
fn test_unexpected_token_is_wrapped_in_error_node() {
    let source = b"let x = 1 2;";
    let tree = parse(&let_language(), source, None).unwrap();

    assert!(tree.root_node().has_error());
    assert!(tree.to_sexp().contains("ERROR"));
    let diagnostics = tree.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E0301);
    assert_covers(&tree, source);
}

#[test]
fn test_diagnostic_positions() {
    let source = b"let a = 1;\nlet b = ;";
    let tree = parse(&let_language(), source, None).unwrap();
    let diagnostics = tree.diagnostics();

    assert_eq!(diagnostics.len(), 1);
    let error = &diagnostics[0];
    assert_eq!(error.code, ErrorCode::E0206);
    assert_eq!(error.range.start(), TextSize::new(19));
    assert_eq!(error.format().lines().next(), Some("2:9 E0206: missing Number"));
}

#[rstest]
#[case("")]
#[case("let")]
#[case("let x")]
#[case("= = =")]
#[case(";;;")]
#[case("let x = 1; garbage")]
#[case("let x = 1 let y = 2;")]
#[case("let let let = = 1 ;")]
#[case("@@@ let x = 1;")]
#[case("let x = 1; €€ let y = 2;")]
#[case("1 2 3 4 5 6 7 8 9 10 11 12")]
fn test_malformed_input_is_fully_covered(#[case] source: &str) {
    let tree = parse(&let_language(), source.as_bytes(), None).unwrap();
    assert_covers(&tree, source.as_bytes());
    if !source.is_empty() {
        assert!(tree.root_node().has_error(), "{source:?} should not parse cleanly");
        assert!(!tree.diagnostics().is_empty());
    }
}

#[rstest]
#[case("let x = ;")]
#[case("let x = 1 2;")]
#[case("let x = 1; @ let y = 2;")]
fn test_recovery_is_deterministic(#[case] source: &str) {
    let language = let_language();
    let first = parse(&language, source.as_bytes(), None).unwrap();
    for _ in 0..5 {
        assert_eq!(parse(&language, source.as_bytes(), None).unwrap(), first);
    }
}

#[test]
fn test_missing_insertion_limit() {
    let config = ParserConfig::default().with_max_missing(0);
    let mut parser = Parser::with_config(let_language(), config);
    let source = b"let x = ;";
    let tree = parser.parse(source).unwrap();

    assert!(tree.leaves().iter().all(|leaf| !leaf.is_missing()));
    assert!(tree.root_node().has_error());
    assert_covers(&tree, source);
}
