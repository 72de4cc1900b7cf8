//! Generalized parsing over conflicted tables

use cairo_syntax::{Parser, ParserConfig, parse};

use crate::helpers::grammars::{ambiguous_sum_language, two_token_lookahead_language};
use crate::helpers::tree_assertions::assert_covers;

#[test]
fn test_conflicts_are_kept_in_the_table() {
    assert!(ambiguous_sum_language().table().conflict_count() > 0);
    assert!(two_token_lookahead_language().table().conflict_count() > 0);
}

#[test]
fn test_ambiguous_input_yields_one_stable_tree() {
    let language = ambiguous_sum_language();
    let source = b"1+2+3+4";
    let first = parse(&language, source, None).unwrap();

    assert!(!first.root_node().has_error());
    assert_covers(&first, source);
    for _ in 0..10 {
        assert_eq!(parse(&language, source, None).unwrap(), first);
    }
}

#[test]
fn test_branch_limit_still_parses() {
    let config = ParserConfig::default().with_max_branches(1);
    let mut parser = Parser::with_config(ambiguous_sum_language(), config);
    let source = b"1+2+3";
    let tree = parser.parse(source).unwrap();
    assert_covers(&tree, source);
}

#[test]
fn test_forked_branch_that_dies_is_discarded() {
    let language = two_token_lookahead_language();

    let statement = parse(&language, b"dogs bark !", None).unwrap();
    assert_eq!(statement.to_sexp(), "(Sentence (Noun (Word)) (Word))");
    assert!(!statement.root_node().has_error());

    let question = parse(&language, b"do cats ?", None).unwrap();
    assert_eq!(question.to_sexp(), "(Sentence (Verb (Word)) (Word))");
    assert!(!question.root_node().has_error());
}
