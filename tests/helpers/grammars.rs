//! Small grammars shared by the engine tests.

use cairo_syntax::Language;
use cairo_syntax::grammar::{GrammarBuilder, choice, repeat, seq, sym, token};

/// `Program: Statement*`, `Statement: Let Ident Eq Number Semi`.
pub fn let_language() -> Language {
    let table = GrammarBuilder::new("let")
        .literal("Let", "let")
        .regex("Ident", "[a-z]+")
        .literal("Eq", "=")
        .regex("Number", "[0-9]+")
        .literal("Semi", ";")
        .regex("_whitespace", "[ \t\n]+")
        .rule("Program", repeat(sym("Statement")))
        .rule("Statement", seq([sym("Let"), sym("Ident"), sym("Eq"), sym("Number"), sym("Semi")]))
        .extra("_whitespace")
        .build()
        .unwrap();
    Language::from_table(table).unwrap()
}

/// An ambiguous sum grammar: `1+2+3` has two derivations.
pub fn ambiguous_sum_language() -> Language {
    let table = GrammarBuilder::new("sum")
        .regex("Number", "[0-9]+")
        .rule("Expr", choice([seq([sym("Expr"), token("+"), sym("Expr")]), sym("Number")]))
        .build()
        .unwrap();
    Language::from_table(table).unwrap()
}

/// Unambiguous but not LR(1): the reduction of the first word depends on the
/// token after the second.
pub fn two_token_lookahead_language() -> Language {
    let table = GrammarBuilder::new("lookahead")
        .regex("Word", "[a-z]+")
        .regex("_whitespace", " +")
        .rule("Sentence", choice([seq([sym("Noun"), sym("Word"), token("!")]), seq([sym("Verb"), sym("Word"), token("?")])]))
        .rule("Noun", sym("Word"))
        .rule("Verb", sym("Word"))
        .extra("_whitespace")
        .build()
        .unwrap();
    Language::from_table(table).unwrap()
}
