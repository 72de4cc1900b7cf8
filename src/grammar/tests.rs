#![allow(clippy::unwrap_used)]

use super::*;
use crate::base::StateId;
use crate::table::{Action, EOF, ERROR, SymbolKind};

fn let_grammar() -> GrammarBuilder {
    GrammarBuilder::new("let")
        .literal("Let", "let")
        .regex("Ident", "[a-z_][a-z0-9_]*")
        .literal("Eq", "=")
        .regex("Number", "[0-9]+")
        .literal("Semi", ";")
        .regex("Whitespace", "[ \t\r\n]+")
        .rule("Program", repeat(sym("Statement")))
        .rule("Statement", seq([sym("Let"), sym("Ident"), sym("Eq"), sym("Number"), sym("Semi")]))
        .extra("Whitespace")
}

fn arithmetic_grammar() -> GrammarBuilder {
    GrammarBuilder::new("arith")
        .regex("Number", "[0-9]+")
        .rule("Expr", sym("_expression"))
        .rule(
            "_expression",
            choice([
                sym("Number"),
                sym("Binary"),
            ]),
        )
        .rule(
            "Binary",
            choice([
                prec_left(1, seq([sym("_expression"), token("+"), sym("_expression")])),
                prec_left(2, seq([sym("_expression"), token("*"), sym("_expression")])),
                prec_right(3, seq([sym("_expression"), token("^"), sym("_expression")])),
            ]),
        )
}

#[test]
fn test_symbol_layout() {
    let table = let_grammar().build().unwrap();

    assert_eq!(table.symbol_name(EOF), "end");
    assert_eq!(table.symbol_name(ERROR), "ERROR");
    // Reserved terminals, six declared terminals, no anonymous tokens.
    assert_eq!(table.terminal_count(), 8);
    assert!(table.symbols.iter().skip(table.terminal_count()).all(|s| s.kind == SymbolKind::Nonterminal));

    let whitespace = table.symbol_for_name("Whitespace").unwrap();
    assert!(table.is_extra(whitespace));
    assert_eq!(table.extras().len(), 1);
}

#[test]
fn test_repeat_helpers_are_hidden() {
    let table = let_grammar().build().unwrap();
    let helper = table
        .symbols
        .iter()
        .position(|s| s.name.starts_with("_Program_repeat"))
        .unwrap();
    assert!(!table.is_visible(helper as SymbolId));
    assert!(table.is_visible(table.symbol_for_name("Program").unwrap()));
}

#[test]
fn test_let_grammar_is_conflict_free() {
    let table = let_grammar().build().unwrap();
    assert_eq!(table.conflict_count(), 0);
}

#[test]
fn test_start_state_accepts_empty_program() {
    let table = let_grammar().build().unwrap();
    // Program -> ε reduces on end of input from the start state.
    let actions = table.lookup(table.start_state(), EOF);
    assert!(matches!(actions, [Action::Reduce { child_count: 0, .. }]));
}

#[test]
fn test_expected_terminals_after_let() {
    let table = let_grammar().build().unwrap();
    let let_token = table.symbol_for_name("Let").unwrap();
    let ident = table.symbol_for_name("Ident").unwrap();

    // Drive the start state to the point right after `let`.
    let mut state = table.start_state();
    loop {
        match table.lookup(state, let_token) {
            [Action::Shift { state: next }] => {
                state = *next;
                break;
            }
            [Action::Reduce { symbol, .. }] => {
                state = table.goto(state, *symbol).unwrap();
            }
            other => panic!("unexpected actions {other:?}"),
        }
    }
    let expected: Vec<_> = table.expected_terminals(state).collect();
    assert_eq!(expected, vec![ident]);
}

#[test]
fn test_lex_modes_include_extras() {
    let table = let_grammar().context_sensitive(true).build().unwrap();
    let whitespace = table.symbol_for_name("Whitespace").unwrap();

    assert_eq!(table.all_terminals().len(), table.terminal_count());
    for state in 0..table.state_count() as StateId {
        assert!(table.valid_terminals(state).contains(whitespace));
    }
}

#[test]
fn test_precedence_resolves_binary_conflicts() {
    let table = arithmetic_grammar().build().unwrap();
    assert_eq!(table.conflict_count(), 0);
    assert!(table.symbol_for_name("+").is_some_and(|id| !table.is_named(id)));
}

#[test]
fn test_unresolved_conflict_keeps_every_candidate() {
    // `a a a` splits both ways without precedence.
    let table = GrammarBuilder::new("ambiguous")
        .literal("A", "a")
        .rule("S", sym("E"))
        .rule("E", choice([seq([sym("E"), sym("E")]), sym("A")]))
        .build()
        .unwrap();

    assert!(table.conflict_count() > 0);
    let forked = table
        .states()
        .iter()
        .flat_map(|s| s.actions.iter())
        .find(|(_, actions)| actions.len() > 1)
        .unwrap();
    assert!(forked.1.iter().any(|a| matches!(a, Action::Shift { .. })));
    assert!(forked.1.iter().any(|a| matches!(a, Action::Reduce { .. })));
}

#[test]
fn test_undefined_symbol_is_rejected() {
    let err = GrammarBuilder::new("bad").rule("S", sym("Missing")).build().unwrap_err();
    assert!(matches!(err, Error::Grammar { .. }));
    assert!(err.to_string().contains("Missing"));
}

#[test]
fn test_extra_must_be_declared() {
    let err = GrammarBuilder::new("bad")
        .literal("A", "a")
        .rule("S", sym("A"))
        .extra("Whitespace")
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("Whitespace"));
}

#[test]
fn test_terminal_and_rule_name_clash() {
    let err = GrammarBuilder::new("bad")
        .literal("A", "a")
        .rule("A", token("b"))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Grammar { .. }));
}

#[test]
fn test_explicit_start_rule() {
    let table = GrammarBuilder::new("start")
        .literal("A", "a")
        .rule("_item", sym("A"))
        .rule("Root", repeat1(sym("_item")))
        .start("Root")
        .build()
        .unwrap();
    let a = table.symbol_for_name("A").unwrap();
    assert!(matches!(table.lookup(table.start_state(), a), [Action::Shift { .. }]));
}
